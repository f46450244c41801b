use crate::domain::model::Participant;
use crate::utils::error::{Result, SantaError};
use crate::utils::validation::{validate_email_address, validate_present};
use std::collections::{BTreeSet, HashSet};

/// 通過驗證的參與者名單，附帶各自的有效排除集合（宣告的排除 ∪ 自己）
#[derive(Debug, Clone)]
pub struct ParticipantRegistry {
    participants: Vec<Participant>,
    effective_exclusions: Vec<BTreeSet<String>>,
}

impl ParticipantRegistry {
    pub fn new(participants: Vec<Participant>) -> Result<Self> {
        Self::validate(&participants)?;

        let effective_exclusions = participants
            .iter()
            .map(|p| {
                let mut excluded = p.exclusions.clone();
                excluded.insert(p.name.clone());
                excluded
            })
            .collect();

        Ok(Self {
            participants,
            effective_exclusions,
        })
    }

    /// 純檢查，不修改輸入；重複呼叫結果相同
    pub fn validate(participants: &[Participant]) -> Result<()> {
        let mut emails = HashSet::new();
        let mut names = HashSet::new();

        for (index, santa) in participants.iter().enumerate() {
            validate_present(&format!("santas[{}].name", index), &santa.name)?;
            let email_field = format!("santas[{}].email", index);
            validate_present(&email_field, &santa.email)?;
            validate_email_address(&email_field, &santa.email)?;

            if !emails.insert(santa.email.as_str()) {
                return Err(SantaError::DuplicateAddress {
                    address: santa.email.clone(),
                });
            }
            if !names.insert(santa.name.as_str()) {
                return Err(SantaError::DuplicateName {
                    name: santa.name.clone(),
                });
            }
        }

        for santa in participants {
            if let Some(missing) = santa.exclusions.iter().find(|e| !names.contains(e.as_str())) {
                return Err(SantaError::UnknownExclusion {
                    santa: santa.name.clone(),
                    exclusion: missing.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.participants.iter().map(|p| p.name.clone()).collect()
    }

    pub fn effective_exclusions(&self, index: usize) -> &BTreeSet<String> {
        &self.effective_exclusions[index]
    }

    pub fn is_allowed(&self, giver_index: usize, receiver: &str) -> bool {
        !self.effective_exclusions[giver_index].contains(receiver)
    }
}
