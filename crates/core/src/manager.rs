//! Owner of every live starfield on a page.
//!
//! A [`StarfieldManager`] is constructed explicitly by the host and passed
//! around; there is no global registry. A rescan stops every tracked
//! instance (cancelling its pending frame) before replacing the set, and new
//! instances get fresh ids, so callbacks scheduled before the rescan can
//! never tick anything afterwards.

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::config::StarfieldConfig;
use crate::prng::Xorshift64;
use crate::scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
use crate::starfield::{InstanceId, Starfield};
use crate::surface::{Surface, SurfaceDiscovery};

/// Tracks all starfields created by the last scan.
pub struct StarfieldManager<S: Surface> {
    config: StarfieldConfig,
    instances: BTreeMap<InstanceId, Starfield<S>>,
    next_id: u64,
    rng: Xorshift64,
    scans: u64,
}

impl<S: Surface> StarfieldManager<S> {
    /// Creates an empty manager. Each instance draws its randomness from a
    /// stream forked off `seed`.
    pub fn new(config: StarfieldConfig, seed: u64) -> Self {
        Self {
            config,
            instances: BTreeMap::new(),
            next_id: 0,
            rng: Xorshift64::new(seed),
            scans: 0,
        }
    }

    pub fn config(&self) -> &StarfieldConfig {
        &self.config
    }

    /// Number of tracked instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Number of completed scans.
    pub fn scans(&self) -> u64 {
        self.scans
    }

    pub fn get(&self, id: InstanceId) -> Option<&Starfield<S>> {
        self.instances.get(&id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut Starfield<S>> {
        self.instances.get_mut(&id)
    }

    /// Ids of tracked instances, in creation order.
    pub fn ids(&self) -> Vec<InstanceId> {
        self.instances.keys().copied().collect()
    }

    /// Tracked instances, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Starfield<S>> {
        self.instances.values()
    }

    /// Stops and drops every tracked instance, then creates and starts one
    /// starfield per surface matching the configured selector.
    ///
    /// Returns the number of instances now tracked.
    pub fn initialize_all<D, F>(&mut self, discovery: &mut D, scheduler: &mut F) -> usize
    where
        D: SurfaceDiscovery<Surface = S> + ?Sized,
        F: FrameScheduler + ?Sized,
    {
        self.shutdown(scheduler);
        let surfaces = discovery.discover(&self.config.selector);
        for surface in surfaces {
            self.next_id += 1;
            let id = InstanceId(self.next_id);
            let mut starfield = Starfield::new(id, surface, self.config.clone(), self.rng.fork());
            starfield.start(scheduler);
            self.instances.insert(id, starfield);
        }
        self.scans += 1;
        debug!(
            "scan {} matched {} surfaces for '{}'",
            self.scans,
            self.instances.len(),
            self.config.selector
        );
        self.instances.len()
    }

    /// Resizes every tracked instance from its layout box. Meant to run on
    /// every viewport size change.
    pub fn resize_all(&mut self) {
        for starfield in self.instances.values_mut() {
            starfield.resize();
        }
    }

    /// Delivers a frame callback to its target. Returns whether a frame ran;
    /// frames for unknown, stopped or superseded targets are dropped.
    pub fn on_frame<F: FrameScheduler + ?Sized>(
        &mut self,
        target: InstanceId,
        handle: FrameHandle,
        scheduler: &mut F,
    ) -> bool {
        match self.instances.get_mut(&target) {
            Some(starfield) => starfield.on_frame(handle, scheduler),
            None => {
                trace!("dropping frame {handle:?} for unknown {target}");
                false
            }
        }
    }

    /// Stops and drops every tracked instance.
    pub fn shutdown<F: FrameScheduler + ?Sized>(&mut self, scheduler: &mut F) {
        for starfield in self.instances.values_mut() {
            starfield.stop(scheduler);
        }
        if !self.instances.is_empty() {
            debug!("discarding {} starfields", self.instances.len());
        }
        self.instances.clear();
    }

    /// Delivers every frame currently due on a [`ManualScheduler`], as one
    /// repaint would. Returns the number of frames that ran.
    pub fn pump(&mut self, scheduler: &mut ManualScheduler) -> usize {
        scheduler
            .take_due()
            .into_iter()
            .filter(|frame| self.on_frame(frame.target, frame.handle, scheduler))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{MemorySurface, StaticDiscovery};
    use crate::starfield::AnimationState;
    use crate::surface::LayoutBox;

    fn manager() -> StarfieldManager<MemorySurface> {
        StarfieldManager::new(StarfieldConfig::default(), 42)
    }

    fn two_surfaces() -> StaticDiscovery<MemorySurface> {
        StaticDiscovery::new(vec![
            MemorySurface::new(100.0, 100.0),
            MemorySurface::new(1000.0, 1000.0),
        ])
    }

    #[test]
    fn new_manager_is_empty() {
        let m = manager();
        assert!(m.is_empty());
        assert_eq!(m.scans(), 0);
    }

    #[test]
    fn initialize_all_creates_and_starts_one_per_surface() {
        let mut m = manager();
        let mut sched = ManualScheduler::new();
        assert_eq!(m.initialize_all(&mut two_surfaces(), &mut sched), 2);
        assert!(m.iter().all(Starfield::is_running));
        let counts: Vec<_> = m.iter().map(|s| s.stars().len()).collect();
        assert_eq!(counts, vec![5, 1000]);
        assert_eq!(sched.pending().len(), 2);
    }

    #[test]
    fn initialize_all_with_no_surfaces_tracks_nothing() {
        let mut m = manager();
        let mut sched = ManualScheduler::new();
        let mut none: StaticDiscovery<MemorySurface> = StaticDiscovery::new(Vec::new());
        assert_eq!(m.initialize_all(&mut none, &mut sched), 0);
        assert!(sched.pending().is_empty());
    }

    #[test]
    fn reinitialize_replaces_without_accumulating() {
        let mut m = manager();
        let mut sched = ManualScheduler::new();
        let mut discovery = two_surfaces();
        m.initialize_all(&mut discovery, &mut sched);
        let first_ids = m.ids();
        m.initialize_all(&mut discovery, &mut sched);

        assert_eq!(m.len(), 2);
        assert_eq!(discovery.scans(), 2);
        let second_ids = m.ids();
        assert!(first_ids.iter().all(|id| !second_ids.contains(id)));
        // Old pending frames were cancelled; only the new instances wait.
        assert_eq!(sched.cancelled(), 2);
        assert_eq!(sched.pending().len(), 2);
        assert!(sched
            .pending()
            .iter()
            .all(|f| second_ids.contains(&f.target)));
    }

    #[test]
    fn frames_from_before_reinit_never_tick() {
        let mut m = manager();
        let mut sched = ManualScheduler::new();
        let mut discovery = two_surfaces();
        m.initialize_all(&mut discovery, &mut sched);
        // The host already queued these callbacks before the rescan.
        let stale = sched.take_due();
        m.initialize_all(&mut discovery, &mut sched);

        for frame in &stale {
            assert!(!m.on_frame(frame.target, frame.handle, &mut sched));
        }
        assert!(m.iter().all(|s| s.frames() == 0));
        assert_eq!(sched.pending().len(), 2);
    }

    #[test]
    fn pump_runs_each_instance_once_per_repaint() {
        let mut m = manager();
        let mut sched = ManualScheduler::new();
        m.initialize_all(&mut two_surfaces(), &mut sched);
        for _ in 0..3 {
            assert_eq!(m.pump(&mut sched), 2);
        }
        assert!(m.iter().all(|s| s.frames() == 3));
    }

    #[test]
    fn on_frame_for_unknown_target_is_dropped() {
        let mut m = manager();
        let mut sched = ManualScheduler::new();
        assert!(!m.on_frame(InstanceId(99), FrameHandle(1), &mut sched));
    }

    #[test]
    fn resize_all_regenerates_every_instance() {
        let mut m = manager();
        let mut sched = ManualScheduler::new();
        m.initialize_all(&mut two_surfaces(), &mut sched);
        for id in m.ids() {
            m.get_mut(id)
                .unwrap()
                .surface_mut()
                .set_layout(Some(LayoutBox::new(200.0, 100.0)));
        }
        m.resize_all();
        assert!(m.iter().all(|s| s.stars().len() == 10));
        assert!(m.iter().all(Starfield::is_running));
    }

    #[test]
    fn resize_all_skips_detached_surfaces() {
        let mut m = manager();
        let mut sched = ManualScheduler::new();
        m.initialize_all(&mut two_surfaces(), &mut sched);
        let id = m.ids()[0];
        m.get_mut(id).unwrap().surface_mut().set_layout(None);
        let before = m.get(id).unwrap().stars().to_vec();
        m.resize_all();
        assert_eq!(m.get(id).unwrap().stars(), before.as_slice());
    }

    #[test]
    fn shutdown_stops_everything() {
        let mut m = manager();
        let mut sched = ManualScheduler::new();
        m.initialize_all(&mut two_surfaces(), &mut sched);
        m.shutdown(&mut sched);
        assert!(m.is_empty());
        assert!(sched.pending().is_empty());
    }

    #[test]
    fn instances_get_independent_streams() {
        let mut m = manager();
        let mut sched = ManualScheduler::new();
        let mut same = StaticDiscovery::new(vec![
            MemorySurface::new(300.0, 300.0),
            MemorySurface::new(300.0, 300.0),
        ]);
        m.initialize_all(&mut same, &mut sched);
        let batches: Vec<_> = m.iter().map(|s| s.stars().to_vec()).collect();
        assert_ne!(batches[0], batches[1]);
    }

    #[test]
    fn same_seed_reproduces_batches() {
        let mut sched = ManualScheduler::new();
        let mut a = manager();
        let mut b = manager();
        a.initialize_all(&mut two_surfaces(), &mut sched);
        b.initialize_all(&mut two_surfaces(), &mut sched);
        let sa: Vec<_> = a.iter().map(|s| s.stars().to_vec()).collect();
        let sb: Vec<_> = b.iter().map(|s| s.stars().to_vec()).collect();
        assert_eq!(sa, sb);
    }

    #[test]
    fn rescan_drops_previous_instances() {
        let mut m = manager();
        let mut sched = ManualScheduler::new();
        let mut discovery = two_surfaces();
        m.initialize_all(&mut discovery, &mut sched);
        let id = m.ids()[0];
        assert_eq!(
            m.get(id).unwrap().state(),
            AnimationState::Running {
                pending: Some(sched.pending()[0].handle)
            }
        );
        m.initialize_all(&mut discovery, &mut sched);
        assert!(m.get(id).is_none());
    }
}
