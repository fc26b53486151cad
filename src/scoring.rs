//! Route scoring capability.
//!
//! The learner treats the economic evaluation of a finished route as an
//! opaque and possibly expensive pure function. This module defines that
//! contract and ships a greedy reference evaluator that assumes an unbounded
//! hold and allows the capital to go negative.

use crate::error::{Result, SolverError};
use crate::instance::{Instance, PortId};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Evaluators a route scorer can be asked for
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum EvaluatorName {
    /// LP relaxation of the trading problem along the route
    #[value(name = "LpProfitCalculator")]
    LpProfitCalculator,
    /// Interval-based exact evaluator
    #[value(name = "IntervalEvaluator")]
    IntervalEvaluator,
    /// Infinite hold, capital allowed to go negative
    #[value(name = "InfiniteCapacityDebtEvaluator")]
    InfiniteCapacityDebtEvaluator,
}

impl EvaluatorName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluatorName::LpProfitCalculator => "LpProfitCalculator",
            EvaluatorName::IntervalEvaluator => "IntervalEvaluator",
            EvaluatorName::InfiniteCapacityDebtEvaluator => "InfiniteCapacityDebtEvaluator",
        }
    }
}

impl fmt::Display for EvaluatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvaluatorName {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "LpProfitCalculator" => Ok(EvaluatorName::LpProfitCalculator),
            "IntervalEvaluator" => Ok(EvaluatorName::IntervalEvaluator),
            "InfiniteCapacityDebtEvaluator" => Ok(EvaluatorName::InfiniteCapacityDebtEvaluator),
            other => Err(SolverError::UnsupportedEvaluator(other.to_string())),
        }
    }
}

/// Score of a route plus the evaluator's trade decisions.
///
/// `decisions[j][m]` holds `(bought, sold)` amounts of good `m` at the j-th
/// position of the route. The learner never inspects it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteScore {
    pub reward: f64,
    pub decisions: Vec<Vec<(f64, f64)>>,
}

impl RouteScore {
    pub fn from_reward(reward: f64) -> Self {
        RouteScore {
            reward,
            decisions: Vec::new(),
        }
    }
}

/// Scores a closed route
pub trait RouteScorer {
    fn score_route(&self, route: &[PortId], evaluator: EvaluatorName) -> Result<RouteScore>;
}

impl<F> RouteScorer for F
where
    F: Fn(&[PortId], EvaluatorName) -> f64,
{
    fn score_route(&self, route: &[PortId], evaluator: EvaluatorName) -> Result<RouteScore> {
        Ok(RouteScore::from_reward(self(route, evaluator)))
    }
}

/// Greedy trade evaluator with an unbounded hold and debt allowed.
///
/// For each good independently, positions on the route are visited from the
/// best selling price down; each one buys from the cheapest earlier position
/// that still has stock, as long as the trade has a positive margin. Travel
/// and visit costs of every leg are then subtracted from the capital.
pub struct GreedyTradeScorer<'a> {
    instance: &'a Instance,
}

impl<'a> GreedyTradeScorer<'a> {
    pub fn new(instance: &'a Instance) -> Self {
        GreedyTradeScorer { instance }
    }

    fn infinite_capacity_debt(&self, route: &[PortId]) -> RouteScore {
        let instance = self.instance;
        let len = route.len();
        let mut capital = instance.initial_capital;
        let mut decisions = vec![vec![(0.0, 0.0); instance.n_goods]; len];

        for m in 0..instance.n_goods {
            let buy_prices: Vec<f64> = route.iter().map(|&v| instance.buy_price[v][m]).collect();
            let sell_prices: Vec<f64> = route.iter().map(|&v| instance.sell_price[v][m]).collect();
            let mut buy_cap: Vec<f64> = route.iter().map(|&v| instance.buy_cap[v][m]).collect();
            let mut sell_cap: Vec<f64> = route.iter().map(|&v| instance.sell_cap[v][m]).collect();

            let mut sell_order: Vec<usize> = (0..len).collect();
            sell_order.sort_by_key(|&j| std::cmp::Reverse(OrderedFloat(sell_prices[j])));
            let mut buy_order: Vec<usize> = (0..len).collect();
            buy_order.sort_by_key(|&j| OrderedFloat(buy_prices[j]));

            for &sell_idx in &sell_order {
                for &buy_idx in &buy_order {
                    if sell_cap[sell_idx] <= 0.0 {
                        break;
                    }
                    if sell_prices[sell_idx] <= buy_prices[buy_idx]
                        || buy_idx >= sell_idx
                        || buy_cap[buy_idx] <= 0.0
                    {
                        continue;
                    }

                    let amount = sell_cap[sell_idx].min(buy_cap[buy_idx]);
                    decisions[buy_idx][m].0 += amount;
                    decisions[sell_idx][m].1 += amount;
                    sell_cap[sell_idx] -= amount;
                    buy_cap[buy_idx] -= amount;
                    capital += amount * (sell_prices[sell_idx] - buy_prices[buy_idx]);
                }
            }
        }

        for leg in route.windows(2) {
            capital -= instance.travel(leg[0], leg[1]) * instance.travel_cost
                + instance.visit_cost[leg[1]];
        }

        RouteScore {
            reward: capital,
            decisions,
        }
    }
}

impl RouteScorer for GreedyTradeScorer<'_> {
    fn score_route(&self, route: &[PortId], evaluator: EvaluatorName) -> Result<RouteScore> {
        match evaluator {
            EvaluatorName::InfiniteCapacityDebtEvaluator => Ok(self.infinite_capacity_debt(route)),
            other => Err(SolverError::UnsupportedEvaluator(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::tests::{four_port_instance, two_port_instance};

    #[test]
    fn test_two_port_trade() {
        let instance = two_port_instance();
        let scorer = GreedyTradeScorer::new(&instance);
        let score = scorer
            .score_route(&[0, 1, 0], EvaluatorName::InfiniteCapacityDebtEvaluator)
            .unwrap();
        // buy 2 at 1, sell 2 at 6, pay two unit legs
        assert_eq!(score.reward, (6.0 - 1.0) * 2.0 - 2.0 + 10.0);
        assert_eq!(score.decisions[0][0], (2.0, 0.0));
        assert_eq!(score.decisions[1][0], (0.0, 2.0));
    }

    #[test]
    fn test_no_trade_without_margin() {
        let instance = four_port_instance();
        let scorer = GreedyTradeScorer::new(&instance);
        let stay = scorer
            .score_route(&[0, 0], EvaluatorName::InfiniteCapacityDebtEvaluator)
            .unwrap();
        assert_eq!(stay.reward, instance.initial_capital);

        let tour = scorer
            .score_route(&[0, 2, 3, 0], EvaluatorName::InfiniteCapacityDebtEvaluator)
            .unwrap();
        // good 1: 5 from port 0 or 2 at 200, sold 5 at port 3 for 1000
        assert_eq!(tour.reward, instance.initial_capital + 5.0 * 800.0);
    }

    #[test]
    fn test_prices_follow_visited_ports() {
        let instance = four_port_instance();
        let scorer = GreedyTradeScorer::new(&instance);
        let score = scorer
            .score_route(&[0, 3, 1, 0], EvaluatorName::InfiniteCapacityDebtEvaluator)
            .unwrap();
        // position 1 is port 3 (good 1 at 1000), position 2 is port 1 (good 0 at 20)
        assert_eq!(score.reward, instance.initial_capital + 5.0 * 800.0 + 10.0 * 10.0);
        assert_eq!(score.decisions[1][1], (0.0, 5.0));
        assert_eq!(score.decisions[2][0], (0.0, 10.0));
        assert_eq!(score.decisions[0][0], (10.0, 0.0));
    }

    #[test]
    fn test_unsupported_evaluator() {
        let instance = two_port_instance();
        let scorer = GreedyTradeScorer::new(&instance);
        assert!(matches!(
            scorer.score_route(&[0, 1, 0], EvaluatorName::LpProfitCalculator),
            Err(SolverError::UnsupportedEvaluator(_))
        ));
    }

    #[test]
    fn test_closure_scorer() {
        let scorer = |route: &[PortId], _: EvaluatorName| route.len() as f64;
        let score = scorer
            .score_route(&[0, 1, 0], EvaluatorName::IntervalEvaluator)
            .unwrap();
        assert_eq!(score.reward, 3.0);
    }

    #[test]
    fn test_evaluator_names_round_trip() {
        for name in [
            EvaluatorName::LpProfitCalculator,
            EvaluatorName::IntervalEvaluator,
            EvaluatorName::InfiniteCapacityDebtEvaluator,
        ] {
            assert_eq!(name.as_str().parse::<EvaluatorName>().unwrap(), name);
        }
        assert!("Unknown".parse::<EvaluatorName>().is_err());
    }
}
