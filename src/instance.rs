//! Module for loading and representing Dutch Merchant instances.
//!
//! An instance describes a set of ports connected by a travel-time matrix, the
//! goods traded at each port (prices and stock on both sides), the vessel and
//! the time budget of the tour. Instances are read from JSON files whose field
//! names follow the public problem schema.

use crate::error::{Result, SolverError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub type PortId = usize;

/// Dutch Merchant problem instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Instance name (optional in files)
    #[serde(default)]
    pub name: String,
    /// Number of ports
    pub n_ports: usize,
    /// Number of goods
    pub n_goods: usize,
    /// t(u,v): travel time from port u to port v
    pub travel_time: Vec<Vec<f64>>,
    /// Cost of one unit of travel time (only used by route scorers)
    #[serde(default)]
    pub travel_cost: f64,
    /// w(m): weight of good m
    pub weight: Vec<f64>,
    /// p+(v,m): buy price of good m at port v
    pub buy_price: Vec<Vec<f64>>,
    /// p-(v,m): sell price of good m at port v
    pub sell_price: Vec<Vec<f64>>,
    /// c+(v,m): stock of good m that can be bought at port v
    pub buy_cap: Vec<Vec<f64>>,
    /// c-(v,m): amount of good m that can be sold at port v
    pub sell_cap: Vec<Vec<f64>>,
    /// S(v): cost of visiting port v
    pub visit_cost: Vec<f64>,
    /// v0: start (and end) port of every tour
    pub start_port: PortId,
    /// B: vessel capacity
    pub capacity: f64,
    /// T: time budget of the tour
    pub time_limit: f64,
    /// f0: starting capital
    pub initial_capital: f64,
}

impl Instance {
    /// Parse an instance from a JSON file and check its dimensions.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        let mut instance: Instance = serde_json::from_reader(BufReader::new(file))?;
        if instance.name.is_empty() {
            instance.name = path
                .as_ref()
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
        }
        instance.validate()?;
        Ok(instance)
    }

    /// Parse an instance from a JSON string and check its dimensions.
    pub fn from_json(data: &str) -> Result<Self> {
        let instance: Instance = serde_json::from_str(data)?;
        instance.validate()?;
        Ok(instance)
    }

    /// Check that every table is consistent with `n_ports` and `n_goods`.
    pub fn validate(&self) -> Result<()> {
        let p = self.n_ports;
        let g = self.n_goods;

        if p == 0 {
            return Err(SolverError::InvalidInstance("instance has no ports".to_string()));
        }
        if self.start_port >= p {
            return Err(SolverError::InvalidInstance(format!(
                "start port {} out of range for {} ports",
                self.start_port, p
            )));
        }

        check_matrix("travel_time", &self.travel_time, p, p)?;
        check_vector("weight", &self.weight, g)?;
        check_matrix("buy_price", &self.buy_price, p, g)?;
        check_matrix("sell_price", &self.sell_price, p, g)?;
        check_matrix("buy_cap", &self.buy_cap, p, g)?;
        check_matrix("sell_cap", &self.sell_cap, p, g)?;
        check_vector("visit_cost", &self.visit_cost, p)?;

        Ok(())
    }

    /// Travel time between two ports
    #[inline]
    pub fn travel(&self, from: PortId, to: PortId) -> f64 {
        self.travel_time[from][to]
    }

    /// Sum of travel times along consecutive legs of a route.
    pub fn route_time(&self, route: &[PortId]) -> f64 {
        route.windows(2).map(|leg| self.travel(leg[0], leg[1])).sum()
    }

    /// Check that a route starts and ends at the start port.
    pub fn is_closed_route(&self, route: &[PortId]) -> bool {
        route.len() >= 2
            && route[0] == self.start_port
            && route[route.len() - 1] == self.start_port
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let mut legs: Vec<f64> = Vec::new();
        for i in 0..self.n_ports {
            for j in 0..self.n_ports {
                if i != j {
                    legs.push(self.travel(i, j));
                }
            }
        }
        let avg_travel_time = if legs.is_empty() {
            0.0
        } else {
            legs.iter().sum::<f64>() / legs.len() as f64
        };
        let max_travel_time = legs.iter().cloned().fold(0.0, f64::max);

        // Best per-unit margin of each good between any buy and any sell port.
        let best_margin = (0..self.n_goods)
            .map(|m| {
                let cheapest = (0..self.n_ports)
                    .filter(|&v| self.buy_cap[v][m] > 0.0)
                    .map(|v| self.buy_price[v][m])
                    .fold(f64::INFINITY, f64::min);
                let dearest = (0..self.n_ports)
                    .filter(|&v| self.sell_cap[v][m] > 0.0)
                    .map(|v| self.sell_price[v][m])
                    .fold(f64::NEG_INFINITY, f64::max);
                dearest - cheapest
            })
            .filter(|m| m.is_finite())
            .fold(0.0, f64::max);

        let reachable_ports = (0..self.n_ports)
            .filter(|&v| v != self.start_port)
            .filter(|&v| {
                self.travel(self.start_port, v) + self.travel(v, self.start_port) <= self.time_limit
            })
            .count();

        InstanceStatistics {
            name: self.name.clone(),
            n_ports: self.n_ports,
            n_goods: self.n_goods,
            start_port: self.start_port,
            capacity: self.capacity,
            time_limit: self.time_limit,
            initial_capital: self.initial_capital,
            reachable_ports,
            avg_travel_time,
            max_travel_time,
            best_margin,
        }
    }
}

fn check_vector(field: &str, values: &[f64], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(SolverError::mismatch(field, expected, values.len()));
    }
    Ok(())
}

fn check_matrix(field: &str, rows: &[Vec<f64>], n_rows: usize, n_cols: usize) -> Result<()> {
    if rows.len() != n_rows {
        return Err(SolverError::mismatch(field, n_rows, rows.len()));
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_cols {
            return Err(SolverError::mismatch(format!("{}[{}]", field, i), n_cols, row.len()));
        }
    }
    Ok(())
}

/// Statistics about an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub n_ports: usize,
    pub n_goods: usize,
    pub start_port: PortId,
    pub capacity: f64,
    pub time_limit: f64,
    pub initial_capital: f64,
    /// Ports whose out-and-back trip from the start fits in the budget
    pub reachable_ports: usize,
    pub avg_travel_time: f64,
    pub max_travel_time: f64,
    /// Largest sell-minus-buy price over all goods
    pub best_margin: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Ports: {} (start port {})", self.n_ports, self.start_port)?;
        writeln!(f, "  Goods: {}", self.n_goods)?;
        writeln!(f, "  Capacity: {}", self.capacity)?;
        writeln!(f, "  Time limit: {}", self.time_limit)?;
        writeln!(f, "  Initial capital: {}", self.initial_capital)?;
        writeln!(f, "  Ports reachable and back: {}", self.reachable_ports)?;
        writeln!(f, "  Avg travel time: {:.2}", self.avg_travel_time)?;
        writeln!(f, "  Max travel time: {:.2}", self.max_travel_time)?;
        writeln!(f, "  Best unit margin: {:.2}", self.best_margin)
    }
}
