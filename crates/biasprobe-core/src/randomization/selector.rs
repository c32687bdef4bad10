//! Variant selection and probe ordering.
//!
//! [`ProbeRandomizer`] picks one variant out of a candidate list, or one
//! ordering of a probe-type list, according to its [`RandomizationConfig`].
//! Every strategy falls back to the full candidate pool once repeat
//! prevention would leave nothing to pick, so a selection over a non-empty
//! pool always succeeds.
//!
//! Lock order: config, sessions, caches (squares / queues), rng.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::domain::{HarnessError, Metadata, ProbeType, ProbeVariant, Result};
use crate::metrics::METRICS;
use crate::obs::emit_session_created;

use super::combinatorics::{
    build_counterbalance_queue, build_order_queue, generate_latin_square, stable_hash, LatinSquare,
};
use super::config::{OrderEffectPrevention, RandomizationConfig, RandomizationStrategy};
use super::session::{SessionContext, SessionId, SessionRegistry, SessionSummary};

/// Hash key used for Latin-square rows and blocks when no session is tracked.
const DEFAULT_SESSION_KEY: &str = "default";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Pick one element of a non-empty index list.
fn choose_index<R: Rng + ?Sized>(rng: &mut R, indices: &[usize]) -> usize {
    indices[rng.gen_range(0..indices.len())]
}

/// `indices` without the variants the session has used, unless that would be empty.
fn unused_or_all(
    pool: &[&ProbeVariant],
    indices: Vec<usize>,
    session: Option<&SessionContext>,
    prevent_repeats: bool,
) -> Vec<usize> {
    let Some(session) = session.filter(|_| prevent_repeats) else {
        return indices;
    };
    let unused: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|&i| !session.has_used(&pool[i].id))
        .collect();
    if unused.is_empty() {
        indices
    } else {
        unused
    }
}

fn bucket(hash: u64, len: usize) -> usize {
    (hash % len as u64) as usize
}

/// Variant selector and probe-order planner.
pub struct ProbeRandomizer {
    config: RwLock<RandomizationConfig>,
    sessions: Arc<SessionRegistry>,
    rng: Mutex<StdRng>,
    latin_squares: RwLock<HashMap<usize, Arc<LatinSquare>>>,
    variant_queues: Mutex<HashMap<ProbeType, VecDeque<String>>>,
    order_queues: Mutex<HashMap<Vec<ProbeType>, VecDeque<Vec<ProbeType>>>>,
}

impl Default for ProbeRandomizer {
    fn default() -> Self {
        Self::new(RandomizationConfig::default())
    }
}

impl std::fmt::Debug for ProbeRandomizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeRandomizer")
            .field("config", &self.config())
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

impl ProbeRandomizer {
    pub fn new(config: RandomizationConfig) -> Self {
        Self::with_registry(config, Arc::new(SessionRegistry::new()))
    }

    /// Create a randomizer over a shared session registry.
    pub fn with_registry(config: RandomizationConfig, sessions: Arc<SessionRegistry>) -> Self {
        if let Some(seed) = config.seed {
            info!(seed, "random seed set");
        }
        Self {
            rng: Mutex::new(seeded_rng(config.seed)),
            config: RwLock::new(config),
            sessions,
            latin_squares: RwLock::new(HashMap::new()),
            variant_queues: Mutex::new(HashMap::new()),
            order_queues: Mutex::new(HashMap::new()),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> RandomizationConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap the configuration. A config carrying a seed re-seeds the generator.
    pub fn configure(&self, config: RandomizationConfig) {
        let mut current = self.config.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(seed) = config.seed {
            *lock(&self.rng) = StdRng::seed_from_u64(seed);
        }
        info!(
            strategy = %config.strategy,
            order_prevention = %config.order_prevention,
            "updated randomization config"
        );
        *current = config;
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    pub fn create_session(&self, metadata: Metadata) -> SessionId {
        let id = self.sessions.create_session(metadata);
        emit_session_created(id.as_str());
        id
    }

    pub fn get_session(&self, id: &SessionId) -> Option<SessionContext> {
        self.sessions.get_session(id)
    }

    pub fn session_summary(&self, id: &SessionId) -> Option<SessionSummary> {
        self.sessions.session_summary(id)
    }

    pub fn reset_session(&self, id: &SessionId) -> bool {
        self.sessions.reset_session(id)
    }

    pub fn cleanup_old_sessions(&self, max_age_hours: u32) -> usize {
        self.sessions.cleanup_old_sessions(max_age_hours)
    }

    /// Select one variant for `probe_type` from `candidates`.
    ///
    /// With `domain` set, candidates are filtered to that domain first. An
    /// empty (filtered) pool is [`HarnessError::NoVariantsAvailable`] and
    /// leaves the session untouched. A successful pick is recorded on the
    /// session before returning.
    pub fn select_variant(
        &self,
        probe_type: ProbeType,
        candidates: &[ProbeVariant],
        session_id: Option<&SessionId>,
        domain: Option<&str>,
    ) -> Result<ProbeVariant> {
        if candidates.is_empty() {
            return Err(HarnessError::NoVariantsAvailable {
                probe_type,
                domain: None,
            });
        }

        let pool: Vec<&ProbeVariant> = match domain {
            Some(domain) => candidates.iter().filter(|v| v.domain == domain).collect(),
            None => candidates.iter().collect(),
        };
        if pool.is_empty() {
            return Err(HarnessError::NoVariantsAvailable {
                probe_type,
                domain: domain.map(str::to_string),
            });
        }

        let config = self.config();
        let selected = self.sessions.with_session(session_id, |session| {
            let view = session.as_deref();
            let index = match config.strategy {
                RandomizationStrategy::SimpleRandom => {
                    self.simple_random(&pool, view, config.prevent_repeats)
                }
                RandomizationStrategy::DomainBalanced => {
                    self.domain_balanced(&pool, view, config.prevent_repeats)
                }
                RandomizationStrategy::Counterbalanced => {
                    self.counterbalanced(&pool, view, probe_type, config.prevent_repeats)
                }
                RandomizationStrategy::LatinSquare => self.latin_square_pick(&pool, view, probe_type, &config),
                RandomizationStrategy::BlockRandomized => self.block_pick(&pool, view, probe_type, &config),
            };

            let chosen = pool[index].clone();
            if let Some(session) = session {
                session.record_selection(&chosen, probe_type);
            }
            chosen
        });

        METRICS.inc_variants_selected();
        debug!(
            probe_type = %probe_type,
            variant_id = %selected.id,
            strategy = %config.strategy,
            "selected variant"
        );
        Ok(selected)
    }

    /// Order `probe_types` according to the configured order-effect prevention.
    ///
    /// Lists of zero or one element are returned unchanged. No repeat
    /// prevention applies: every call may reuse the same set of types.
    pub fn select_probe_order(
        &self,
        probe_types: &[ProbeType],
        session_id: Option<&SessionId>,
    ) -> Vec<ProbeType> {
        if probe_types.len() <= 1 {
            return probe_types.to_vec();
        }

        let config = self.config();
        let session_key = match session_id {
            Some(id) if self.sessions.contains(id) => id.as_str(),
            _ => DEFAULT_SESSION_KEY,
        };

        let ordered = match config.order_prevention {
            OrderEffectPrevention::None => probe_types.to_vec(),
            OrderEffectPrevention::RandomOrder => {
                let mut ordered = probe_types.to_vec();
                ordered.shuffle(&mut *lock(&self.rng));
                ordered
            }
            OrderEffectPrevention::Counterbalanced => self.counterbalanced_order(probe_types),
            OrderEffectPrevention::LatinSquare => {
                let square = self.latin_square(probe_types.len());
                let row = bucket(stable_hash(&[session_key]), square.size());
                square.row(row).iter().map(|&i| probe_types[i]).collect()
            }
            OrderEffectPrevention::BlockRandomized => {
                self.block_order(probe_types, config.block_size)
            }
        };

        debug!(
            order = ?ordered,
            order_prevention = %config.order_prevention,
            "selected probe order"
        );
        ordered
    }

    /// Latin square of size `n`, generated at most once per size.
    pub fn latin_square(&self, n: usize) -> Arc<LatinSquare> {
        let cached = self
            .latin_squares
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&n)
            .cloned();
        if let Some(square) = cached {
            return square;
        }

        let mut squares = self
            .latin_squares
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let square = squares
            .entry(n)
            .or_insert_with(|| Arc::new(generate_latin_square(n, &mut *lock(&self.rng))));
        Arc::clone(square)
    }

    fn simple_random(
        &self,
        pool: &[&ProbeVariant],
        session: Option<&SessionContext>,
        prevent_repeats: bool,
    ) -> usize {
        let candidates = unused_or_all(pool, (0..pool.len()).collect(), session, prevent_repeats);
        choose_index(&mut *lock(&self.rng), &candidates)
    }

    fn domain_balanced(
        &self,
        pool: &[&ProbeVariant],
        session: Option<&SessionContext>,
        prevent_repeats: bool,
    ) -> usize {
        // Groups keep first-appearance order so a seeded run is reproducible.
        let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
        for (i, variant) in pool.iter().enumerate() {
            match groups.iter_mut().find(|(domain, _)| *domain == variant.domain) {
                Some((_, members)) => members.push(i),
                None => groups.push((variant.domain.as_str(), vec![i])),
            }
        }

        let usage = |g: usize| session.map_or(0, |s| s.domain_count(groups[g].0));
        let has_unused = |g: usize| {
            session.map_or(true, |s| groups[g].1.iter().any(|&i| !s.has_used(&pool[i].id)))
        };

        let mut eligible: Vec<usize> = (0..groups.len())
            .filter(|&g| !prevent_repeats || has_unused(g))
            .collect();
        if eligible.is_empty() {
            eligible = (0..groups.len()).collect();
        }
        let min_usage = eligible.iter().map(|&g| usage(g)).min().unwrap_or(0);
        eligible.retain(|&g| usage(g) == min_usage);

        let mut rng = lock(&self.rng);
        let group = choose_index(&mut *rng, &eligible);
        let members = unused_or_all(pool, groups[group].1.clone(), session, prevent_repeats);
        choose_index(&mut *rng, &members)
    }

    fn counterbalanced(
        &self,
        pool: &[&ProbeVariant],
        session: Option<&SessionContext>,
        probe_type: ProbeType,
        prevent_repeats: bool,
    ) -> usize {
        let next = {
            let mut queues = lock(&self.variant_queues);
            let queue = queues.entry(probe_type).or_insert_with(|| {
                let ids: Vec<String> = pool.iter().map(|v| v.id.clone()).collect();
                build_counterbalance_queue(&ids, &mut *lock(&self.rng))
            });

            let mut next = None;
            while let Some(id) = queue.pop_front() {
                let Some(index) = pool.iter().position(|v| v.id == id) else {
                    continue;
                };
                let used = session.is_some_and(|s| s.has_used(&id));
                if !(prevent_repeats && used) {
                    next = Some(index);
                    break;
                }
            }
            next
        };

        match next {
            Some(index) => index,
            None => {
                debug!(probe_type = %probe_type, "counterbalance queue exhausted, falling back to simple random");
                self.simple_random(pool, session, prevent_repeats)
            }
        }
    }

    fn latin_square_pick(
        &self,
        pool: &[&ProbeVariant],
        session: Option<&SessionContext>,
        probe_type: ProbeType,
        config: &RandomizationConfig,
    ) -> usize {
        let n = pool.len().min(config.latin_square_size);
        if n == 0 {
            return self.simple_random(pool, session, config.prevent_repeats);
        }

        let square = self.latin_square(n);
        let session_key = session.map_or(DEFAULT_SESSION_KEY, |s| s.session_id.as_str());
        let row = bucket(stable_hash(&[session_key]), n);
        let col = bucket(stable_hash(&[probe_type.as_str()]), n);
        let index = square.cell(row, col) % pool.len();

        let used = session.is_some_and(|s| s.has_used(&pool[index].id));
        if config.prevent_repeats && used {
            self.simple_random(pool, session, config.prevent_repeats)
        } else {
            index
        }
    }

    fn block_pick(
        &self,
        pool: &[&ProbeVariant],
        session: Option<&SessionContext>,
        probe_type: ProbeType,
        config: &RandomizationConfig,
    ) -> usize {
        let size = config.block_size.min(pool.len()).max(1);
        let indices: Vec<usize> = (0..pool.len()).collect();
        let blocks: Vec<&[usize]> = indices.chunks(size).collect();

        let session_key = session.map_or(DEFAULT_SESSION_KEY, |s| s.session_id.as_str());
        let block = bucket(stable_hash(&[session_key, probe_type.as_str()]), blocks.len());

        let mut members = unused_or_all(pool, blocks[block].to_vec(), session, config.prevent_repeats);
        let mut rng = lock(&self.rng);
        members.shuffle(&mut *rng);
        choose_index(&mut *rng, &members)
    }

    /// Next whole-list permutation from the shared queue for this set of types.
    ///
    /// Queues are keyed by the sorted set of probe types and refilled with
    /// fresh permutations when exhausted.
    fn counterbalanced_order(&self, probe_types: &[ProbeType]) -> Vec<ProbeType> {
        let mut key = probe_types.to_vec();
        key.sort();

        let mut queues = lock(&self.order_queues);
        let queue = queues.entry(key).or_default();
        if queue.is_empty() {
            *queue = build_order_queue(probe_types, &mut *lock(&self.rng));
        }
        queue.pop_front().unwrap_or_else(|| probe_types.to_vec())
    }

    fn block_order(&self, probe_types: &[ProbeType], block_size: usize) -> Vec<ProbeType> {
        let size = block_size.min(probe_types.len()).max(1);
        let mut blocks: Vec<Vec<ProbeType>> = probe_types.chunks(size).map(<[_]>::to_vec).collect();

        let mut rng = lock(&self.rng);
        for block in blocks.iter_mut() {
            block.shuffle(&mut *rng);
        }
        blocks.shuffle(&mut *rng);
        blocks.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn variants(specs: &[(&str, &str)]) -> Vec<ProbeVariant> {
        specs
            .iter()
            .map(|(id, domain)| ProbeVariant::new(*id, *domain, format!("prompt {id}")))
            .collect()
    }

    fn randomizer(strategy: RandomizationStrategy) -> ProbeRandomizer {
        ProbeRandomizer::new(RandomizationConfig::default().with_strategy(strategy).with_seed(7))
    }

    const ALL_STRATEGIES: [RandomizationStrategy; 5] = [
        RandomizationStrategy::SimpleRandom,
        RandomizationStrategy::DomainBalanced,
        RandomizationStrategy::Counterbalanced,
        RandomizationStrategy::LatinSquare,
        RandomizationStrategy::BlockRandomized,
    ];

    #[test]
    fn test_empty_candidates_is_error() {
        let r = randomizer(RandomizationStrategy::SimpleRandom);
        let err = r.select_variant(ProbeType::Anchoring, &[], None, None).unwrap_err();
        assert!(matches!(err, HarnessError::NoVariantsAvailable { domain: None, .. }));
    }

    #[test]
    fn test_domain_filter_without_matches_leaves_session_untouched() {
        let r = randomizer(RandomizationStrategy::DomainBalanced);
        let id = r.create_session(Metadata::new());
        let pool = variants(&[("a1", "health"), ("a2", "finance")]);

        let err = r
            .select_variant(ProbeType::Anchoring, &pool, Some(&id), Some("sports"))
            .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::NoVariantsAvailable { domain: Some(ref d), .. } if d == "sports"
        ));

        let session = r.get_session(&id).unwrap();
        assert!(session.used_variants.is_empty());
        assert!(session.execution_order.is_empty());
        assert!(session.last_execution.is_none());
    }

    #[test]
    fn test_domain_filter_restricts_selection() {
        for strategy in ALL_STRATEGIES {
            let r = randomizer(strategy);
            let pool = variants(&[("a1", "health"), ("a2", "finance"), ("a3", "health")]);
            for _ in 0..10 {
                let v = r
                    .select_variant(ProbeType::Framing, &pool, None, Some("finance"))
                    .unwrap();
                assert_eq!(v.id, "a2", "strategy {strategy}");
            }
        }
    }

    #[test]
    fn test_every_strategy_covers_pool_before_repeating() {
        for strategy in ALL_STRATEGIES {
            let r = randomizer(strategy);
            let id = r.create_session(Metadata::new());
            let pool = variants(&[("v1", "a"), ("v2", "a"), ("v3", "b"), ("v4", "c"), ("v5", "c")]);

            let picked: HashSet<String> = (0..pool.len())
                .map(|_| {
                    r.select_variant(ProbeType::Availability, &pool, Some(&id), None)
                        .unwrap()
                        .id
                })
                .collect();
            assert_eq!(picked.len(), pool.len(), "strategy {strategy} repeated early");
        }
    }

    #[test]
    fn test_exhausted_pool_falls_back_to_repeats() {
        for strategy in ALL_STRATEGIES {
            let r = randomizer(strategy);
            let id = r.create_session(Metadata::new());
            let pool = variants(&[("only", "a")]);
            for _ in 0..3 {
                let v = r.select_variant(ProbeType::Optimism, &pool, Some(&id), None).unwrap();
                assert_eq!(v.id, "only");
            }
            let session = r.get_session(&id).unwrap();
            assert_eq!(session.execution_order.len(), 3);
            assert_eq!(session.domain_count("a"), 3);
        }
    }

    #[test]
    fn test_selection_without_session_does_not_track() {
        let r = randomizer(RandomizationStrategy::SimpleRandom);
        let id = r.create_session(Metadata::new());
        let pool = variants(&[("v1", "a"), ("v2", "b")]);
        r.select_variant(ProbeType::Anchoring, &pool, None, None).unwrap();
        assert!(r.get_session(&id).unwrap().used_variants.is_empty());
    }

    #[test]
    fn test_seeded_randomizers_agree() {
        let pool = variants(&[("v1", "a"), ("v2", "a"), ("v3", "b"), ("v4", "c")]);
        let pick = || {
            let r = randomizer(RandomizationStrategy::SimpleRandom);
            (0..8)
                .map(|_| r.select_variant(ProbeType::Anchoring, &pool, None, None).unwrap().id)
                .collect::<Vec<_>>()
        };
        assert_eq!(pick(), pick());
    }

    #[test]
    fn test_latin_square_pick_is_deterministic_per_session_and_probe() {
        let r = ProbeRandomizer::new(
            RandomizationConfig::default()
                .with_strategy(RandomizationStrategy::LatinSquare)
                .with_prevent_repeats(false)
                .with_seed(3),
        );
        let pool = variants(&[("v1", "a"), ("v2", "a"), ("v3", "b"), ("v4", "c")]);
        let first = r.select_variant(ProbeType::BaseRate, &pool, None, None).unwrap();
        for _ in 0..5 {
            let again = r.select_variant(ProbeType::BaseRate, &pool, None, None).unwrap();
            assert_eq!(again.id, first.id);
        }
    }

    #[test]
    fn test_latin_square_zero_size_falls_back() {
        let mut config = RandomizationConfig::default()
            .with_strategy(RandomizationStrategy::LatinSquare)
            .with_seed(1);
        config.latin_square_size = 0;
        let r = ProbeRandomizer::new(config);
        let pool = variants(&[("v1", "a")]);
        assert_eq!(
            r.select_variant(ProbeType::Framing, &pool, None, None).unwrap().id,
            "v1"
        );
    }

    #[test]
    fn test_latin_square_cache_builds_once_per_size() {
        let r = randomizer(RandomizationStrategy::LatinSquare);
        let a = r.latin_square(4);
        let b = r.latin_square(4);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.is_latin());
    }

    #[test]
    fn test_block_pick_stays_within_one_block_without_session() {
        let mut config = RandomizationConfig::default()
            .with_strategy(RandomizationStrategy::BlockRandomized)
            .with_seed(9);
        config.block_size = 2;
        let r = ProbeRandomizer::new(config);
        let pool = variants(&[("v1", "a"), ("v2", "a"), ("v3", "b"), ("v4", "b"), ("v5", "c")]);

        let picked: HashSet<String> = (0..30)
            .map(|_| r.select_variant(ProbeType::Conjunction, &pool, None, None).unwrap().id)
            .collect();
        let blocks: [HashSet<String>; 3] = [
            ["v1", "v2"].iter().map(|s| s.to_string()).collect(),
            ["v3", "v4"].iter().map(|s| s.to_string()).collect(),
            ["v5"].iter().map(|s| s.to_string()).collect(),
        ];
        assert!(blocks.iter().any(|b| picked.is_subset(b)), "picked {picked:?}");
    }

    #[test]
    fn test_order_short_lists_unchanged() {
        let r = randomizer(RandomizationStrategy::SimpleRandom);
        assert!(r.select_probe_order(&[], None).is_empty());
        assert_eq!(r.select_probe_order(&[ProbeType::Framing], None), vec![ProbeType::Framing]);
    }

    #[test]
    fn test_every_order_strategy_returns_permutation() {
        let types = [
            ProbeType::Anchoring,
            ProbeType::Framing,
            ProbeType::SunkCost,
            ProbeType::Optimism,
            ProbeType::BaseRate,
        ];
        for prevention in [
            OrderEffectPrevention::None,
            OrderEffectPrevention::RandomOrder,
            OrderEffectPrevention::Counterbalanced,
            OrderEffectPrevention::LatinSquare,
            OrderEffectPrevention::BlockRandomized,
        ] {
            let r = ProbeRandomizer::new(
                RandomizationConfig::default()
                    .with_order_prevention(prevention)
                    .with_seed(5),
            );
            let id = r.create_session(Metadata::new());
            for _ in 0..6 {
                let mut ordered = r.select_probe_order(&types, Some(&id));
                ordered.sort();
                let mut expected = types.to_vec();
                expected.sort();
                assert_eq!(ordered, expected, "{prevention}");
            }
        }
    }

    #[test]
    fn test_none_order_is_identity() {
        let r = ProbeRandomizer::new(
            RandomizationConfig::default().with_order_prevention(OrderEffectPrevention::None),
        );
        let types = [ProbeType::Framing, ProbeType::Anchoring, ProbeType::Optimism];
        assert_eq!(r.select_probe_order(&types, None), types.to_vec());
    }

    #[test]
    fn test_latin_order_is_stable_for_a_session() {
        let r = ProbeRandomizer::new(
            RandomizationConfig::default()
                .with_order_prevention(OrderEffectPrevention::LatinSquare)
                .with_seed(2),
        );
        let id = r.create_session(Metadata::new());
        let types = [ProbeType::Framing, ProbeType::Anchoring, ProbeType::Optimism];
        let first = r.select_probe_order(&types, Some(&id));
        assert_eq!(r.select_probe_order(&types, Some(&id)), first);
    }

    #[test]
    fn test_counterbalanced_order_refills_after_exhaustion() {
        let r = ProbeRandomizer::new(
            RandomizationConfig::default()
                .with_order_prevention(OrderEffectPrevention::Counterbalanced)
                .with_seed(4),
        );
        let types = [ProbeType::Framing, ProbeType::Anchoring, ProbeType::Optimism];
        for _ in 0..(crate::randomization::COUNTERBALANCE_REPETITIONS * 3) {
            assert_eq!(r.select_probe_order(&types, None).len(), 3);
        }
    }

    #[test]
    fn test_configure_swaps_strategy() {
        let r = randomizer(RandomizationStrategy::SimpleRandom);
        r.configure(RandomizationConfig::default().with_strategy(RandomizationStrategy::LatinSquare));
        assert_eq!(r.config().strategy, RandomizationStrategy::LatinSquare);
    }
}
