//! Declared categorical label sets

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the bucket collecting undeclared labels
pub const OTHER_LABEL: &str = "other";

/// What to do with a label outside the declared set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownLabelPolicy {
    /// Fail with an invalid input error
    #[default]
    Reject,
    /// Route to a trailing `other` bucket
    Other,
}

/// Ordered set of label values
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSet {
    names: Vec<String>,
    index: HashMap<String, usize>,
    policy: UnknownLabelPolicy,
}

impl LabelSet {
    /// Labels in declared order
    pub fn new<I, S>(names: I, policy: UnknownLabelPolicy) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self {
            names: Vec::new(),
            index: HashMap::new(),
            policy,
        };
        for name in names {
            let name = name.into();
            if set.index.contains_key(&name) {
                return Err(Error::configuration(format!("label '{name}' declared twice")));
            }
            set.index.insert(name.clone(), set.names.len());
            set.names.push(name);
        }
        if set.names.is_empty() {
            return Err(Error::configuration("label set is empty"));
        }
        if policy == UnknownLabelPolicy::Other && !set.index.contains_key(OTHER_LABEL) {
            set.index.insert(OTHER_LABEL.to_string(), set.names.len());
            set.names.push(OTHER_LABEL.to_string());
        }
        Ok(set)
    }

    /// Every distinct value of `observed`, sorted, as a label set
    ///
    /// Multi-label values are split on `delimiter` when one is given.
    pub fn from_observed<'a, I>(
        observed: I,
        delimiter: Option<&str>,
        policy: UnknownLabelPolicy,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut values: Vec<&str> = observed
            .into_iter()
            .flat_map(|value| match delimiter {
                Some(delimiter) => value.split(delimiter).collect::<Vec<_>>(),
                None => vec![value],
            })
            .collect();
        values.sort_unstable();
        values.dedup();
        Self::new(values, policy)
    }

    /// Bucket names in output order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Policy for undeclared labels
    pub fn policy(&self) -> UnknownLabelPolicy {
        self.policy
    }

    /// Bucket index of `label`
    pub fn resolve(&self, label: &str) -> Result<usize> {
        if let Some(&id) = self.index.get(label) {
            return Ok(id);
        }
        match self.policy {
            UnknownLabelPolicy::Reject => Err(Error::invalid_input(format!(
                "label '{label}' is not among the declared labels"
            ))),
            UnknownLabelPolicy::Other => self.index.get(OTHER_LABEL).copied().ok_or_else(|| {
                Error::invalid_input(format!("no '{OTHER_LABEL}' bucket for label '{label}'"))
            }),
        }
    }
}
