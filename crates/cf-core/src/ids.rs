use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::block::Block;
use crate::rng::SaltSource;
use crate::traverse::{collect_all_blocks, visit_mut};

const SALT_LEN: usize = 9;
const SALT_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Produces `TYPE-<millis>-<salt>` ids. The timestamp never goes backwards.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    salts: SaltSource,
    last_millis: u128,
}

impl IdGenerator {
    pub fn seeded(seed: u32) -> Self {
        Self {
            salts: SaltSource::new(seed),
            last_millis: 0,
        }
    }

    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        Self::seeded((nanos & u128::from(u32::MAX)) as u32)
    }

    pub fn generate(&mut self, type_name: &str) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        self.last_millis = self.last_millis.max(now);

        let salt = (0..SALT_LEN)
            .map(|_| char::from(self.salts.pick(SALT_ALPHABET)))
            .collect::<String>();
        format!("{}-{}-{}", type_name, self.last_millis, salt)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::from_clock()
    }
}

pub fn generate_id(type_name: &str) -> String {
    IdGenerator::from_clock().generate(type_name)
}

/// Fills every missing id across all collections. Existing ids are never touched,
/// so a second run assigns nothing. Returns how many ids were assigned.
pub fn add_unique_ids(blocks: &mut [Block], ids: &mut IdGenerator) -> usize {
    let mut taken = collect_all_blocks(blocks)
        .into_iter()
        .filter(|block| block.has_id())
        .map(|block| block.id.clone())
        .collect::<BTreeSet<_>>();
    let mut assigned = 0;
    visit_mut(blocks, &mut |block| {
        if block.has_id() {
            return;
        }
        let mut candidate = ids.generate(block.type_name());
        while taken.contains(&candidate) {
            candidate = ids.generate(block.type_name());
        }
        taken.insert(candidate.clone());
        block.id = candidate;
        assigned += 1;
    });
    assigned
}

pub fn all_blocks_have_ids(blocks: &[Block]) -> bool {
    collect_all_blocks(blocks)
        .into_iter()
        .all(|block| block.has_id())
}
