//! Policy network: per-port scores from the context and the current port.

use crate::instance::PortId;
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::relu;

/// Scores every port given the instance context and the current position.
///
/// Masked ports receive `-inf`, so their probability is zero under any finite
/// temperature.
#[derive(Module, Debug)]
pub struct PolicyNetwork<B: Backend> {
    port_embedding: Linear<B>,
    context_hidden: Linear<B>,
    context_output: Linear<B>,
    decoder_hidden: Linear<B>,
    decoder_output: Linear<B>,
}

impl<B: Backend> PolicyNetwork<B> {
    pub fn new(n_ports: usize, embedding_dim: usize, hidden_dim: usize, device: &B::Device) -> Self {
        PolicyNetwork {
            port_embedding: LinearConfig::new(n_ports, embedding_dim).init(device),
            context_hidden: LinearConfig::new(embedding_dim * 2, hidden_dim).init(device),
            context_output: LinearConfig::new(hidden_dim, hidden_dim).init(device),
            decoder_hidden: LinearConfig::new(hidden_dim + embedding_dim, hidden_dim).init(device),
            decoder_output: LinearConfig::new(hidden_dim, n_ports).init(device),
        }
    }

    /// Number of ports scored by this network
    pub fn n_ports(&self) -> usize {
        self.decoder_output.weight.dims()[1]
    }

    /// `context` is `[1, 2E]`; `mask` is `[1, P]` with true meaning forbidden.
    /// Returns `[1, P]` scores.
    pub fn forward(
        &self,
        context: Tensor<B, 2>,
        current_port: PortId,
        mask: Option<Tensor<B, 2, Bool>>,
    ) -> Tensor<B, 2> {
        let device = context.device();
        let current = self.one_hot(current_port, &device);
        let current_embed = self.port_embedding.forward(current);

        let context = relu(self.context_hidden.forward(context));
        let context = relu(self.context_output.forward(context));

        let combined = Tensor::cat(vec![context, current_embed], 1);
        let hidden = relu(self.decoder_hidden.forward(combined));
        let logits = self.decoder_output.forward(hidden);

        match mask {
            Some(mask) => logits.mask_fill(mask, f32::NEG_INFINITY),
            None => logits,
        }
    }

    fn one_hot(&self, port: PortId, device: &B::Device) -> Tensor<B, 2> {
        let n_ports = self.n_ports();
        let mut values = vec![0.0f32; n_ports];
        values[port] = 1.0;
        let data = TensorData::new(values, [1, n_ports]).convert::<B::FloatElem>();
        Tensor::from_data(data, device)
    }
}

/// Turn a forbidden-port vector into a `[1, P]` boolean tensor.
pub fn mask_tensor<B: Backend>(forbidden: &[bool], device: &B::Device) -> Tensor<B, 2, Bool> {
    Tensor::from_data(TensorData::new(forbidden.to_vec(), [1, forbidden.len()]), device)
}
