use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::RegnetError;

/// Direction of regulation, taken from the sign of the expression correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EdgeSign {
    #[default]
    Activation,
    Repression,
}

impl EdgeSign {
    pub fn from_correlation(correlation: Option<f64>) -> Self {
        match correlation {
            Some(c) if c < 0.0 => EdgeSign::Repression,
            _ => EdgeSign::Activation,
        }
    }

    pub fn as_i8(&self) -> i8 {
        match self {
            EdgeSign::Activation => 1,
            EdgeSign::Repression => -1,
        }
    }
}

impl Display for EdgeSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

impl FromStr for EdgeSign {
    type Err = RegnetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" | "+1" | "+" | "activation" => Ok(EdgeSign::Activation),
            "-1" | "-" | "repression" => Ok(EdgeSign::Repression),
            _ => Err(RegnetError::Parse(format!("Unknown edge sign: {}", s))),
        }
    }
}

/// The component scores an edge weight was combined from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeComponents {
    pub binding_score: Option<f64>,
    pub correlation: Option<f64>,
}

///
/// A weighted TF -> gene edge. `weight` is always in `[0, 1]`; the direction of
/// regulation lives in `sign`.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub tf_id: String,
    pub gene_id: String,
    pub weight: f64,
    pub sign: EdgeSign,
    pub components: EdgeComponents,
}

impl NetworkEdge {
    pub fn new(
        tf_id: impl Into<String>,
        gene_id: impl Into<String>,
        weight: f64,
        components: EdgeComponents,
    ) -> Result<Self, RegnetError> {
        let tf_id = tf_id.into();
        let gene_id = gene_id.into();
        if !(0.0..=1.0).contains(&weight) {
            return Err(RegnetError::InvalidScore(format!(
                "edge weight {} for {} -> {} is outside [0, 1]",
                weight, tf_id, gene_id
            )));
        }
        Ok(NetworkEdge {
            tf_id,
            gene_id,
            weight,
            sign: EdgeSign::from_correlation(components.correlation),
            components,
        })
    }

    pub fn as_string(&self) -> String {
        let fmt_opt = |v: Option<f64>| v.map_or("NA".to_string(), |v| v.to_string());
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.tf_id,
            self.gene_id,
            self.weight,
            self.sign,
            fmt_opt(self.components.binding_score),
            fmt_opt(self.components.correlation),
        )
    }
}

///
/// A regulatory network for one condition: TF -> gene edges, unique per
/// `(tf_id, gene_id)`. Built once, then only read and compared.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegulatoryNetwork {
    edges: BTreeMap<(String, String), NetworkEdge>,
}

impl RegulatoryNetwork {
    ///
    /// Assemble a network from edges. Fails on a repeated `(tf_id, gene_id)`, since a
    /// network never holds two edges for one pair.
    ///
    pub fn from_edges<I>(edges: I) -> Result<Self, RegnetError>
    where
        I: IntoIterator<Item = NetworkEdge>,
    {
        let mut map = BTreeMap::new();
        for edge in edges {
            let key = (edge.tf_id.clone(), edge.gene_id.clone());
            if map.contains_key(&key) {
                return Err(RegnetError::Parse(format!(
                    "duplicate edge {} -> {}",
                    key.0, key.1
                )));
            }
            map.insert(key, edge);
        }
        Ok(RegulatoryNetwork { edges: map })
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn get(&self, tf_id: &str, gene_id: &str) -> Option<&NetworkEdge> {
        self.edges.get(&(tf_id.to_string(), gene_id.to_string()))
    }

    /// All edges in `(tf_id, gene_id)` order.
    pub fn edges(&self) -> impl Iterator<Item = &NetworkEdge> {
        self.edges.values()
    }

    /// Source nodes (TFs with at least one out-edge), sorted.
    pub fn tfs(&self) -> BTreeSet<&str> {
        self.edges.keys().map(|(tf, _)| tf.as_str()).collect()
    }

    /// Out-edges of one TF, sorted by gene id.
    pub fn out_edges<'a>(&'a self, tf_id: &'a str) -> impl Iterator<Item = &'a NetworkEdge> + 'a {
        self.edges
            .range((tf_id.to_string(), String::new())..)
            .take_while(move |((tf, _), _)| tf == tf_id)
            .map(|(_, edge)| edge)
    }

    pub fn targets<'a>(&'a self, tf_id: &'a str) -> BTreeSet<&'a str> {
        self.out_edges(tf_id).map(|e| e.gene_id.as_str()).collect()
    }

    pub fn out_weight(&self, tf_id: &str) -> f64 {
        self.out_edges(tf_id).map(|e| e.weight).sum()
    }
}
