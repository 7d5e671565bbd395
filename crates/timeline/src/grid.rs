use serde::{Deserialize, Serialize};

use crate::scale::snap_ms;
use crate::settings::Timeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridMode {
    /// Fixed ms intervals.
    Time,
    /// Musical bars/beats/subdivisions from tempo and time signature.
    Bars,
}

/// Bar boundary with its 1-based bar number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureMarker {
    pub bar: u32,
    pub ms: f64,
}

/// Beat boundary. Primary beats (the first of each bar) render heavier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatMarker {
    pub ms: f64,
    pub primary: bool,
}

/// A text label placed along the ruler. Emitted independently of grid lines
/// so density can differ.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLabel {
    pub ms: f64,
    pub text: String,
}

/// Musical timing context that turns a visible ms window into grid markers
/// and snap targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Timebase {
    pub tempo_bpm: f64,
    pub time_signature: (u32, u32),
    /// Finest subdivision as a fraction of a whole note (16 means 1/16ths).
    pub resolution: u32,
    pub triplet: bool,
    /// 0..1, delays every second subdivision toward the following one.
    pub swing: f64,
    pub mode: GridMode,
}

impl Default for Timebase {
    fn default() -> Self {
        Self {
            tempo_bpm: 120.0,
            time_signature: (4, 4),
            resolution: 16,
            triplet: false,
            swing: 0.0,
            mode: GridMode::Bars,
        }
    }
}

impl Timebase {
    pub fn new(tempo_bpm: f64, time_signature: (u32, u32)) -> Self {
        Self {
            tempo_bpm,
            time_signature,
            ..Self::default()
        }
    }

    fn is_valid(&self) -> bool {
        self.tempo_bpm.is_finite()
            && self.tempo_bpm > 0.0
            && self.time_signature.0 > 0
            && self.time_signature.1 > 0
            && self.resolution > 0
    }

    /// Duration of one beat in the current signature. A beat is one
    /// `1/denominator` note.
    pub fn ms_per_beat(&self) -> f64 {
        60_000.0 / self.tempo_bpm * (4.0 / self.time_signature.1 as f64)
    }

    pub fn ms_per_bar(&self) -> f64 {
        self.ms_per_beat() * self.time_signature.0 as f64
    }

    /// Duration of the finest grid subdivision.
    pub fn ms_per_subdivision(&self) -> f64 {
        let whole = 4.0 * 60_000.0 / self.tempo_bpm;
        let base = whole / self.resolution as f64;
        if self.triplet { base * 2.0 / 3.0 } else { base }
    }

    /// Bar boundaries within `[start_ms, end_ms]`.
    pub fn measures(&self, start_ms: f64, end_ms: f64) -> Vec<MeasureMarker> {
        if !self.is_valid() {
            return Vec::new();
        }
        let bar_ms = self.ms_per_bar();
        let mut markers = Vec::new();
        let mut bar = (start_ms / bar_ms).floor().max(0.0) as u64;
        loop {
            let ms = bar as f64 * bar_ms;
            if ms > end_ms {
                break;
            }
            if ms >= start_ms {
                markers.push(MeasureMarker {
                    bar: bar as u32 + 1,
                    ms,
                });
            }
            bar += 1;
        }
        markers
    }

    /// Beat boundaries within `[start_ms, end_ms]`, flagging bar starts.
    pub fn beats(&self, start_ms: f64, end_ms: f64) -> Vec<BeatMarker> {
        if !self.is_valid() {
            return Vec::new();
        }
        let beat_ms = self.ms_per_beat();
        let beats_per_bar = self.time_signature.0 as u64;
        let mut markers = Vec::new();
        let mut beat = (start_ms / beat_ms).floor().max(0.0) as u64;
        loop {
            let ms = beat as f64 * beat_ms;
            if ms > end_ms {
                break;
            }
            if ms >= start_ms {
                markers.push(BeatMarker {
                    ms,
                    primary: beat % beats_per_bar == 0,
                });
            }
            beat += 1;
        }
        markers
    }

    /// Finest-resolution boundaries within `[start_ms, end_ms]`, with swing
    /// applied to every second subdivision.
    pub fn subdivisions(&self, start_ms: f64, end_ms: f64) -> Vec<f64> {
        if !self.is_valid() {
            return Vec::new();
        }
        let sub_ms = self.ms_per_subdivision();
        let swing = self.swing.clamp(0.0, 1.0);
        let mut out = Vec::new();
        // Start one early: a swung line can fall inside the window even when
        // its unswung position is before it.
        let mut idx = ((start_ms / sub_ms).floor() - 1.0).max(0.0) as u64;
        loop {
            let base = idx as f64 * sub_ms;
            if base > end_ms {
                break;
            }
            let ms = self.swung_subdivision(idx, sub_ms, swing);
            if ms >= start_ms && ms <= end_ms {
                out.push(ms);
            }
            idx += 1;
        }
        out
    }

    fn swung_subdivision(&self, idx: u64, sub_ms: f64, swing: f64) -> f64 {
        let base = idx as f64 * sub_ms;
        if idx % 2 == 1 {
            base + swing * sub_ms / 2.0
        } else {
            base
        }
    }

    /// Round to the nearest active grid line under the current mode.
    pub fn snap(&self, ms: f64, settings: &Timeline) -> f64 {
        match self.mode {
            GridMode::Time => snap_ms(ms, settings.snap_interval_ms()),
            GridMode::Bars => {
                if !self.is_valid() {
                    return ms.max(0.0);
                }
                let sub_ms = self.ms_per_subdivision();
                let swing = self.swing.clamp(0.0, 1.0);
                let center = (ms / sub_ms).round().max(0.0) as i64;
                let mut best = 0.0;
                let mut best_dist = f64::INFINITY;
                for idx in center.saturating_sub(1)..=center + 1 {
                    if idx < 0 {
                        continue;
                    }
                    let line = self.swung_subdivision(idx as u64, sub_ms, swing);
                    let dist = (ms - line).abs();
                    if dist < best_dist {
                        best = line;
                        best_dist = dist;
                    }
                }
                best.max(0.0)
            }
        }
    }

    /// Ruler labels for the window, thinned so neighbors sit at least
    /// `min_spacing_px` apart at the given zoom.
    pub fn labels(
        &self,
        start_ms: f64,
        end_ms: f64,
        px_per_ms: f64,
        min_spacing_px: f64,
        settings: &Timeline,
    ) -> Vec<GridLabel> {
        if !self.is_valid() || !(px_per_ms > 0.0) {
            return Vec::new();
        }
        match self.mode {
            GridMode::Bars => {
                let bar_px = self.ms_per_bar() * px_per_ms;
                let stride = label_stride(bar_px, min_spacing_px);
                self.measures(start_ms, end_ms)
                    .into_iter()
                    .filter(|m| (m.bar as u64 - 1) % stride == 0)
                    .map(|m| GridLabel {
                        ms: m.ms,
                        text: m.bar.to_string(),
                    })
                    .collect()
            }
            GridMode::Time => {
                let interval = settings.snap_interval_ms();
                if !(interval > 0.0) {
                    return Vec::new();
                }
                let stride = label_stride(interval * px_per_ms, min_spacing_px);
                let step = interval * stride as f64;
                let mut labels = Vec::new();
                let mut idx = (start_ms / step).ceil().max(0.0) as u64;
                loop {
                    let ms = idx as f64 * step;
                    if ms > end_ms {
                        break;
                    }
                    labels.push(GridLabel {
                        ms,
                        text: format_time_label(ms, interval),
                    });
                    idx += 1;
                }
                labels
            }
        }
    }
}

fn label_stride(unit_px: f64, min_spacing_px: f64) -> u64 {
    if unit_px >= min_spacing_px {
        1
    } else {
        (min_spacing_px / unit_px).ceil() as u64
    }
}

fn format_time_label(ms: f64, interval_ms: f64) -> String {
    let total_ms = ms.round() as u64;
    let minutes = total_ms / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    if interval_ms < 1000.0 {
        format!("{}:{:02}.{:03}", minutes, seconds, total_ms % 1000)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
