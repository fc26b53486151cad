//! Instance encoder: flat numeric features and the context embedding.

use crate::instance::Instance;
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::relu;

/// Length of the flat feature vector for `n_ports` ports and `n_goods` goods.
pub fn feature_dim(n_ports: usize, n_goods: usize) -> usize {
    n_ports * n_ports + n_goods + 4 * n_ports * n_goods + n_ports + 4
}

/// Flatten an instance into its feature vector.
///
/// Order: travel time, weight, buy price, sell price, buy capacity, sell
/// capacity, visit cost, then start port, capacity, time limit and capital.
pub fn encode_features(instance: &Instance) -> Vec<f32> {
    let mut features = Vec::with_capacity(feature_dim(instance.n_ports, instance.n_goods));

    for row in &instance.travel_time {
        features.extend(row.iter().map(|&x| x as f32));
    }
    features.extend(instance.weight.iter().map(|&x| x as f32));
    for table in [
        &instance.buy_price,
        &instance.sell_price,
        &instance.buy_cap,
        &instance.sell_cap,
    ] {
        for row in table {
            features.extend(row.iter().map(|&x| x as f32));
        }
    }
    features.extend(instance.visit_cost.iter().map(|&x| x as f32));
    features.extend([
        instance.start_port as f32,
        instance.capacity as f32,
        instance.time_limit as f32,
        instance.initial_capital as f32,
    ]);

    features
}

/// Two-layer perceptron mapping the feature vector to a `2E` context.
#[derive(Module, Debug)]
pub struct InstanceEncoder<B: Backend> {
    input: Linear<B>,
    output: Linear<B>,
}

impl<B: Backend> InstanceEncoder<B> {
    pub fn new(
        n_ports: usize,
        n_goods: usize,
        embedding_dim: usize,
        hidden_dim: usize,
        device: &B::Device,
    ) -> Self {
        InstanceEncoder {
            input: LinearConfig::new(feature_dim(n_ports, n_goods), hidden_dim).init(device),
            output: LinearConfig::new(hidden_dim, embedding_dim * 2).init(device),
        }
    }

    /// Number of features this encoder expects
    pub fn input_dim(&self) -> usize {
        self.input.weight.dims()[0]
    }

    /// `[1, F]` features to a `[1, 2E]` context embedding.
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let hidden = relu(self.input.forward(features));
        self.output.forward(hidden)
    }

    /// Encode an instance into its context embedding.
    pub fn encode(&self, instance: &Instance, device: &B::Device) -> Tensor<B, 2> {
        let features = encode_features(instance);
        let width = features.len();
        let data = TensorData::new(features, [1, width]).convert::<B::FloatElem>();
        self.forward(Tensor::from_data(data, device))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::tests::{four_port_instance, two_port_instance};
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_feature_dim_matches_layout() {
        for instance in [two_port_instance(), four_port_instance()] {
            let features = encode_features(&instance);
            assert_eq!(features.len(), feature_dim(instance.n_ports, instance.n_goods));
        }
        assert_eq!(feature_dim(4, 2), 16 + 2 + 32 + 4 + 4);
    }

    #[test]
    fn test_feature_order() {
        let instance = two_port_instance();
        let features = encode_features(&instance);
        // travel time first
        assert_eq!(&features[0..4], &[0.0, 1.0, 1.0, 0.0]);
        // weight
        assert_eq!(features[4], 1.0);
        // buy price, sell price, buy cap, sell cap
        assert_eq!(&features[5..7], &[1.0, 10.0]);
        assert_eq!(&features[7..9], &[0.0, 6.0]);
        assert_eq!(&features[9..11], &[2.0, 0.0]);
        assert_eq!(&features[11..13], &[0.0, 10.0]);
        // visit cost, then the scalars
        assert_eq!(&features[13..15], &[0.0, 0.0]);
        assert_eq!(&features[15..], &[0.0, 2.0, 10.0, 10.0]);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let device = Default::default();
        let instance = four_port_instance();
        let encoder = InstanceEncoder::<TestBackend>::new(4, 2, 8, 16, &device);
        assert_eq!(encoder.input_dim(), feature_dim(4, 2));

        let first = encoder.encode(&instance, &device);
        let second = encoder.encode(&instance, &device);
        assert_eq!(first.dims(), [1, 16]);
        first.into_data().assert_eq(&second.into_data(), true);
    }
}
