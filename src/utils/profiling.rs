use std::time::Duration;

/// Timing and counter data gathered over one `step_world` call.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepProfile {
    pub integrate_time: Duration,
    pub broad_phase_time: Duration,
    pub narrow_phase_time: Duration,
    pub total_time: Duration,

    pub sub_steps: u32,
    pub body_count: usize,
    pub active_cells: usize,
    /// Pairs pushed to the working list, summed over sub-steps.
    pub candidate_pairs: usize,
    /// Pairs whose SAT test reported an overlap.
    pub contacts: usize,
    /// Pairs handed to the resolver.
    pub resolved: usize,
    /// Pairs vetoed by a `pre_contact` callback or involving a sensor.
    pub vetoed: usize,
    pub pool_allocated: usize,
}

impl StepProfile {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn report(&self) {
        let total_us = self.total_time.as_micros() as f32;
        if total_us < 1.0 || !log::log_enabled!(log::Level::Debug) {
            return;
        }

        log::debug!(
            "physics step: {} bodies, {} sub-steps, {} active cells, {} pairs, {} contacts, {} resolved, {} vetoed",
            self.body_count,
            self.sub_steps,
            self.active_cells,
            self.candidate_pairs,
            self.contacts,
            self.resolved,
            self.vetoed
        );
        log::debug!(
            "  integrate {:.3} ms ({:.1}%), broad {:.3} ms ({:.1}%), narrow {:.3} ms ({:.1}%)",
            self.integrate_time.as_secs_f32() * 1000.0,
            (self.integrate_time.as_micros() as f32 / total_us) * 100.0,
            self.broad_phase_time.as_secs_f32() * 1000.0,
            (self.broad_phase_time.as_micros() as f32 / total_us) * 100.0,
            self.narrow_phase_time.as_secs_f32() * 1000.0,
            (self.narrow_phase_time.as_micros() as f32 / total_us) * 100.0
        );
    }
}
