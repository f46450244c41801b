use crate::core::registry::ParticipantRegistry;
use crate::domain::model::{Assignment, Assignments, CpuBudget};
use crate::domain::ports::CpuClock;
use crate::utils::error::{Result, SantaError};
use rand::seq::SliceRandom;
use rand::Rng;

/// 每隔多少次嘗試讀一次時鐘；讀取行程 CPU 時間遠比一次洗牌昂貴
pub const CLOCK_SAMPLE_INTERVAL: u64 = 1024;

/// 以拒絕取樣產生分配：隨機洗牌收禮名單，違反排除就重來，直到成功或 CPU 預算用完
pub struct AssignmentEngine<R: Rng, C: CpuClock> {
    rng: R,
    clock: C,
    budget: CpuBudget,
}

impl<R: Rng, C: CpuClock> AssignmentEngine<R, C> {
    pub fn new(rng: R, clock: C, budget: CpuBudget) -> Self {
        Self { rng, clock, budget }
    }

    pub fn budget(&self) -> CpuBudget {
        self.budget
    }

    pub fn assign(&mut self, registry: &ParticipantRegistry) -> Result<Assignments> {
        let participants = registry.participants();
        let mut receivers = registry.names();
        let start = self.clock.cpu_time();
        let mut attempts: u64 = 0;

        let mut spent = std::time::Duration::ZERO;

        loop {
            if attempts % CLOCK_SAMPLE_INTERVAL == 0 {
                spent = self.clock.cpu_time().saturating_sub(start);
                if self.budget.is_exceeded(spent) {
                    tracing::warn!(
                        "⏱️ Gave up after {} attempts ({:?} CPU time)",
                        attempts,
                        spent
                    );
                    return Err(SantaError::AssignmentTimeout {
                        budget: match self.budget {
                            CpuBudget::Limited(limit) => limit,
                            CpuBudget::Unlimited => spent,
                        },
                        attempts,
                    });
                }
            }

            attempts += 1;
            receivers.shuffle(&mut self.rng);

            let valid = receivers
                .iter()
                .enumerate()
                .all(|(giver, receiver)| registry.is_allowed(giver, receiver));

            if valid {
                tracing::debug!("Found valid assignments after {} attempts", attempts);
                let pairs = participants
                    .iter()
                    .cloned()
                    .zip(receivers)
                    .map(|(giver, receiver)| Assignment { giver, receiver })
                    .collect();
                return Ok(Assignments::new(pairs, attempts));
            }

            if attempts % (CLOCK_SAMPLE_INTERVAL * 16) == 0 {
                tracing::debug!("Still searching: {} attempts, {:?} CPU time", attempts, spent);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Participant;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::time::Duration;

    /// 每次讀取前進固定時間的假時鐘
    struct SteppingClock {
        now: Duration,
        step: Duration,
    }

    impl CpuClock for SteppingClock {
        fn cpu_time(&mut self) -> Duration {
            self.now += self.step;
            self.now
        }
    }

    struct FrozenClock;

    impl CpuClock for FrozenClock {
        fn cpu_time(&mut self) -> Duration {
            Duration::ZERO
        }
    }

    /// 記錄讀取次數的步進時鐘
    struct CountingClock {
        reads: u64,
        step: Duration,
    }

    impl CpuClock for CountingClock {
        fn cpu_time(&mut self) -> Duration {
            self.reads += 1;
            self.step * self.reads as u32
        }
    }

    fn engine(seed: u64, budget: CpuBudget) -> AssignmentEngine<StdRng, FrozenClock> {
        AssignmentEngine::new(StdRng::seed_from_u64(seed), FrozenClock, budget)
    }

    fn assert_valid(registry: &ParticipantRegistry, assignments: &Assignments) {
        assert_eq!(assignments.len(), registry.len());
        let receivers: HashSet<&str> = assignments.iter().map(|a| a.receiver.as_str()).collect();
        assert_eq!(receivers.len(), registry.len());
        for (index, assignment) in assignments.iter().enumerate() {
            assert_eq!(assignment.giver, registry.participants()[index]);
            assert!(registry.is_allowed(index, &assignment.receiver));
        }
    }

    #[test]
    fn test_couples_never_give_to_each_other() {
        let registry = ParticipantRegistry::new(vec![
            Participant::new("A", "a@example.com").with_exclusions(["B"]),
            Participant::new("B", "b@example.com").with_exclusions(["A"]),
            Participant::new("C", "c@example.com").with_exclusions(["D"]),
            Participant::new("D", "d@example.com").with_exclusions(["C"]),
        ])
        .unwrap();

        for seed in 0..50 {
            let assignments = engine(seed, CpuBudget::default()).assign(&registry).unwrap();
            assert_valid(&registry, &assignments);
            assert_ne!(assignments.receiver_of("A"), Some("B"));
            assert_ne!(assignments.receiver_of("B"), Some("A"));
        }
    }

    #[test]
    fn test_one_sided_exclusion_is_satisfied() {
        let registry = ParticipantRegistry::new(vec![
            Participant::new("A", "a@example.com").with_exclusions(["B"]),
            Participant::new("B", "b@example.com"),
            Participant::new("C", "c@example.com"),
        ])
        .unwrap();

        let assignments = engine(3, CpuBudget::default()).assign(&registry).unwrap();
        assert_valid(&registry, &assignments);
        // 只有 A→C, C→B, B→A 這一種
        assert_eq!(assignments.receiver_of("A"), Some("C"));
        assert_eq!(assignments.receiver_of("B"), Some("A"));
        assert_eq!(assignments.receiver_of("C"), Some("B"));
    }

    #[test]
    fn test_mutual_pair_with_one_other_cannot_be_satisfied() {
        // A 與 B 都只能送給 C
        let registry = ParticipantRegistry::new(vec![
            Participant::new("A", "a@example.com").with_exclusions(["B"]),
            Participant::new("B", "b@example.com").with_exclusions(["A"]),
            Participant::new("C", "c@example.com"),
        ])
        .unwrap();
        let clock = SteppingClock {
            now: Duration::ZERO,
            step: Duration::from_millis(1),
        };
        let mut engine =
            AssignmentEngine::new(StdRng::seed_from_u64(11), clock, CpuBudget::from_millis(200));
        assert!(matches!(
            engine.assign(&registry),
            Err(SantaError::AssignmentTimeout { .. })
        ));
    }

    #[test]
    fn test_no_one_is_their_own_santa() {
        let santas: Vec<Participant> = (0..8)
            .map(|i| Participant::new(format!("P{}", i), format!("p{}@example.com", i)))
            .collect();
        let registry = ParticipantRegistry::new(santas).unwrap();

        for seed in 0..20 {
            let assignments = engine(seed, CpuBudget::Unlimited).assign(&registry).unwrap();
            assert_valid(&registry, &assignments);
            assert!(assignments.iter().all(|a| a.giver.name != a.receiver));
            assert!(assignments.attempts() >= 1);
        }
    }

    #[test]
    fn test_unsatisfiable_times_out() {
        let names = ["A", "B", "C"];
        let santas = names
            .iter()
            .map(|n| {
                Participant::new(*n, format!("{}@example.com", n))
                    .with_exclusions(names.iter().filter(|o| *o != n).copied())
            })
            .collect();
        let registry = ParticipantRegistry::new(santas).unwrap();

        let clock = SteppingClock {
            now: Duration::ZERO,
            step: Duration::from_millis(1),
        };
        let mut engine = AssignmentEngine::new(
            StdRng::seed_from_u64(7),
            clock,
            CpuBudget::from_millis(50),
        );

        let err = engine.assign(&registry).unwrap_err();
        assert!(matches!(
            err,
            SantaError::AssignmentTimeout { budget, .. } if budget == Duration::from_millis(50)
        ));
    }

    #[test]
    fn test_clock_is_sampled_not_read_every_attempt() {
        let names = ["A", "B", "C"];
        let santas = names
            .iter()
            .map(|n| {
                Participant::new(*n, format!("{}@example.com", n))
                    .with_exclusions(names.iter().filter(|o| *o != n).copied())
            })
            .collect();
        let registry = ParticipantRegistry::new(santas).unwrap();

        let mut engine = AssignmentEngine::new(
            StdRng::seed_from_u64(3),
            CountingClock {
                reads: 0,
                step: Duration::from_millis(1),
            },
            CpuBudget::from_millis(20),
        );

        let err = engine.assign(&registry).unwrap_err();
        let reads = engine.clock.reads;
        match err {
            SantaError::AssignmentTimeout { attempts, .. } => {
                // 起始讀一次，之後每 CLOCK_SAMPLE_INTERVAL 次嘗試讀一次
                assert_eq!(attempts, (reads - 2) * CLOCK_SAMPLE_INTERVAL);
                assert!(attempts / reads >= CLOCK_SAMPLE_INTERVAL / 2);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_quick_success_reads_clock_twice() {
        let registry = ParticipantRegistry::new(vec![
            Participant::new("A", "a@example.com"),
            Participant::new("B", "b@example.com"),
        ])
        .unwrap();
        let mut engine = AssignmentEngine::new(
            StdRng::seed_from_u64(1),
            CountingClock {
                reads: 0,
                step: Duration::from_millis(1),
            },
            CpuBudget::default(),
        );
        let assignments = engine.assign(&registry).unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(engine.clock.reads, 2);
    }

    #[test]
    fn test_empty_registry_yields_empty_assignments() {
        let registry = ParticipantRegistry::new(Vec::new()).unwrap();
        let assignments = engine(1, CpuBudget::default()).assign(&registry).unwrap();
        assert!(assignments.is_empty());
        assert_eq!(assignments.attempts(), 1);
    }

    #[test]
    fn test_unseeded_rng_still_valid() {
        let registry = ParticipantRegistry::new(vec![
            Participant::new("A", "a@example.com"),
            Participant::new("B", "b@example.com"),
        ])
        .unwrap();
        let mut engine = AssignmentEngine::new(rand::rng(), FrozenClock, CpuBudget::default());
        let assignments = engine.assign(&registry).unwrap();
        assert_eq!(assignments.receiver_of("A"), Some("B"));
        assert_eq!(assignments.receiver_of("B"), Some("A"));
    }
}
