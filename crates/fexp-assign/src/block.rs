use std::collections::BTreeMap;

use fexp_core::errors::{ErrorInfo, FexpError};
use fexp_core::{Assignment, AssignmentDesign, Probabilities, RngHandle};
use rand::seq::index;

/// Complete randomization carried out separately inside each block.
///
/// Every block treats exactly its configured count, which guarantees balance
/// on whatever covariate defines the blocks. Blocks are visited in label
/// order so draws are reproducible from the seed alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDesign {
    units: usize,
    members: BTreeMap<String, Vec<usize>>,
    treated: BTreeMap<String, usize>,
}

impl BlockDesign {
    /// `blocks[i]` is the block of unit `i`; `treated` gives the count per block.
    pub fn new(blocks: &[String], treated: BTreeMap<String, usize>) -> Result<Self, FexpError> {
        let mut members: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, block) in blocks.iter().enumerate() {
            members.entry(block.clone()).or_default().push(idx);
        }
        for (block, units) in &members {
            let Some(count) = treated.get(block) else {
                return Err(FexpError::InvalidArgument(
                    ErrorInfo::new("block_count_missing", "no treated count for block")
                        .with_context("block", block),
                ));
            };
            if *count > units.len() {
                return Err(FexpError::InvalidArgument(
                    ErrorInfo::new("treated_count", "block treated count exceeds block size")
                        .with_context("block", block)
                        .with_context("n", units.len())
                        .with_context("m", count),
                ));
            }
        }
        if let Some(block) = treated.keys().find(|block| !members.contains_key(*block)) {
            return Err(FexpError::InvalidArgument(
                ErrorInfo::new("block_unknown", "treated count given for a block with no units")
                    .with_context("block", block),
            ));
        }
        Ok(Self {
            units: blocks.len(),
            members,
            treated,
        })
    }

    /// Block labels in draw order.
    pub fn blocks(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// Positions of the units in `block`.
    pub fn members(&self, block: &str) -> Option<&[usize]> {
        self.members.get(block).map(Vec::as_slice)
    }

    /// Treated count configured for `block`.
    pub fn treated_in(&self, block: &str) -> Option<usize> {
        self.treated.get(block).copied()
    }
}

impl AssignmentDesign for BlockDesign {
    fn name(&self) -> &str {
        "block"
    }

    fn units(&self) -> usize {
        self.units
    }

    fn draw(&self, rng: &mut RngHandle) -> Result<Assignment, FexpError> {
        let mut flags = vec![false; self.units];
        for (block, units) in &self.members {
            let count = self.treated.get(block).copied().unwrap_or(0);
            for pick in index::sample(rng, units.len(), count) {
                flags[units[pick]] = true;
            }
        }
        Ok(Assignment::from_flags(flags))
    }

    fn probabilities(&self) -> Option<Probabilities> {
        let mut values = vec![0.0; self.units];
        for (block, units) in &self.members {
            let count = self.treated.get(block).copied().unwrap_or(0);
            let p = count as f64 / units.len() as f64;
            for unit in units {
                values[*unit] = p;
            }
        }
        Probabilities::new(values).ok()
    }
}
