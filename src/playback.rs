//! Block visibility and time-scaled block replay.
//!
//! The visibility slider hides the tail of the spiral; the replay reveals the
//! blocks one by one, waiting each block's real inter-block time divided by
//! the replay speed.

use std::time::Duration;

use crate::scene::PlacedItem;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BlockVisibility
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How many leading blocks of the epoch are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockVisibility {
    total: usize,
    visible: usize,
    percent: u8,
}

impl BlockVisibility {
    /// Everything visible.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            visible: total,
            percent: 100,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn is_full(&self) -> bool {
        self.visible >= self.total
    }

    /// Slider position → `floor(total · pct / 100)` blocks.
    pub fn set_percent(&mut self, percent: u8) {
        let percent = percent.min(100);
        self.percent = percent;
        self.visible = self.total * percent as usize / 100;
    }

    /// Show exactly `count` leading blocks; the slider follows.
    pub fn set_visible(&mut self, count: usize) {
        self.visible = count.min(self.total);
        self.percent = if self.total == 0 {
            100
        } else {
            (self.visible * 100 / self.total) as u8
        };
    }

    pub fn show_all(&mut self) {
        self.visible = self.total;
        self.percent = 100;
    }

    /// Height of the last visible block, `None` when nothing is shown.
    pub fn highest_visible_height(&self, blocks: &[PlacedItem]) -> Option<u64> {
        let last = self.visible.checked_sub(1)?;
        blocks
            .get(last)
            .and_then(|item| item.block_info())
            .map(|info| info.height)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Replay
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaySpeed {
    X1000,
    X10000,
    X100000,
}

impl ReplaySpeed {
    pub const ALL: [ReplaySpeed; 3] = [ReplaySpeed::X1000, ReplaySpeed::X10000, ReplaySpeed::X100000];

    pub fn factor(self) -> u32 {
        match self {
            ReplaySpeed::X1000 => 1_000,
            ReplaySpeed::X10000 => 10_000,
            ReplaySpeed::X100000 => 100_000,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReplaySpeed::X1000 => "1000x",
            ReplaySpeed::X10000 => "10000x",
            ReplaySpeed::X100000 => "100000x",
        }
    }

    /// Wait after a block with the given gap. Negative gaps count by their
    /// magnitude; the floor is 1 ms.
    pub fn delay(self, time_difference: i64) -> Duration {
        let nanos = time_difference.unsigned_abs() as u128 * 1_000_000_000 / self.factor() as u128;
        Duration::from_nanos(nanos.clamp(1_000_000, u64::MAX as u128) as u64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ReplayRun {
    speed: ReplaySpeed,
    next: usize,
    until_next: Duration,
}

/// Outcome of pressing a replay button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayToggle {
    Started(ReplaySpeed),
    Stopped,
}

/// Replay driver, advanced by frame time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockReplay {
    run: Option<ReplayRun>,
}

impl BlockReplay {
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn speed(&self) -> Option<ReplaySpeed> {
        self.run.map(|r| r.speed)
    }

    /// Start a replay, or stop the running one (whatever its speed).
    pub fn toggle(&mut self, speed: ReplaySpeed, visibility: &mut BlockVisibility) -> ReplayToggle {
        if self.run.is_some() {
            self.stop(visibility);
            return ReplayToggle::Stopped;
        }
        if visibility.total() == 0 {
            return ReplayToggle::Stopped;
        }

        log::info!("replay: starting at {} over {} blocks", speed.label(), visibility.total());
        visibility.set_visible(0);
        self.run = Some(ReplayRun {
            speed,
            next: 0,
            until_next: Duration::ZERO,
        });
        ReplayToggle::Started(speed)
    }

    /// Stop and show every block.
    pub fn stop(&mut self, visibility: &mut BlockVisibility) {
        if self.run.take().is_some() {
            log::debug!("replay: stopped");
        }
        visibility.show_all();
    }

    /// Advance by `dt`, revealing every block whose turn has come.
    pub fn tick(&mut self, dt: Duration, blocks: &[PlacedItem], visibility: &mut BlockVisibility) {
        let Some(mut run) = self.run else {
            return;
        };
        let total = visibility.total().min(blocks.len());
        let mut budget = dt;

        loop {
            if run.until_next > budget {
                run.until_next -= budget;
                break;
            }
            budget -= run.until_next;

            if run.next >= total {
                self.stop(visibility);
                return;
            }

            visibility.set_visible(run.next + 1);
            let gap = if run.next == 0 {
                0
            } else {
                blocks[run.next].block_info().map_or(0, |info| info.time_difference)
            };
            run.until_next = run.speed.delay(gap);
            run.next += 1;
        }

        self.run = Some(run);
    }
}
