use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// 一位可以擔任聖誕老人的參與者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub email: String,
    /// 此人不應該送禮的對象（例如配偶）
    #[serde(default)]
    pub exclusions: BTreeSet<String>,
}

impl Participant {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            exclusions: BTreeSet::new(),
        }
    }

    pub fn with_exclusions<I, S>(mut self, exclusions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions.extend(exclusions.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub giver: Participant,
    pub receiver: String,
}

/// 一次執行的分配結果，建立後不再變動
#[derive(Debug, Clone)]
pub struct Assignments {
    pairs: Vec<Assignment>,
    attempts: u64,
}

impl Assignments {
    pub(crate) fn new(pairs: Vec<Assignment>, attempts: u64) -> Self {
        Self { pairs, attempts }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Assignment> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn receiver_of(&self, giver: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|a| a.giver.name == giver)
            .map(|a| a.receiver.as_str())
    }
}

impl<'a> IntoIterator for &'a Assignments {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuBudget {
    Limited(Duration),
    Unlimited,
}

impl CpuBudget {
    pub const DEFAULT_MILLIS: u64 = 10_000;

    pub fn from_millis(millis: u64) -> Self {
        CpuBudget::Limited(Duration::from_millis(millis))
    }

    pub fn is_exceeded(&self, spent: Duration) -> bool {
        match self {
            CpuBudget::Limited(limit) => spent > *limit,
            CpuBudget::Unlimited => false,
        }
    }
}

impl Default for CpuBudget {
    fn default() -> Self {
        CpuBudget::from_millis(Self::DEFAULT_MILLIS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}
