//! Transition graph construction for the frame-blend animation.
//!
//! Given N equal-sized frames, the graph holds each frame for a fixed
//! still duration and linearly crossfades consecutive frames. The graph
//! is pure data: segment count and chaining topology can be asserted
//! directly, and the ffmpeg `-filter_complex` text is produced by a
//! separate serializer.
//!
//! Shape by frame count:
//! - N = 1: one hold, zero transitions.
//! - N >= 2: N holds and N-1 transitions; transition `i` consumes the
//!   output of transition `i-1` (frame 0 for the first) and frame `i+1`.

use std::path::Path;

// ---------------------------------------------------------------------------
// Output normalization constants (applied regardless of N)
// ---------------------------------------------------------------------------

/// Spatial width of the rendered animation; height keeps aspect.
pub const OUTPUT_WIDTH: u32 = 512;
/// Output frame rate.
pub const OUTPUT_FPS: u32 = 15;
/// Output pixel format.
pub const OUTPUT_PIXEL_FORMAT: &str = "yuv420p";

// ---------------------------------------------------------------------------
// Duration policy
// ---------------------------------------------------------------------------

/// How hold and fade durations combine into a total playable duration.
///
/// With `overlap` set, each crossfade plays during the tail of the
/// previous hold: total = N*still - (N-1)*fade. Without it, fades add
/// nothing and the total is the plain sum N*still.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationPolicy {
    /// Seconds each frame is held.
    pub still_secs: f64,
    /// Seconds each crossfade lasts.
    pub fade_secs: f64,
    /// Whether fades overlap the holds they connect.
    pub overlap: bool,
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            still_secs: 2.0,
            fade_secs: 1.0,
            overlap: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Graph segments
// ---------------------------------------------------------------------------

/// A video stream inside the filter graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamRef {
    /// The looped input for frame `i` (`[i:v]`).
    Input(usize),
    /// The output of transition `i` (`[v{i}]`).
    Blend(usize),
}

impl StreamRef {
    /// Filter-graph label for this stream.
    pub fn label(&self) -> String {
        match self {
            StreamRef::Input(i) => format!("[{i}:v]"),
            StreamRef::Blend(i) => format!("[v{i}]"),
        }
    }
}

/// One held frame: input `input_index` looped for `duration_secs`.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldSegment {
    pub input_index: usize,
    pub duration_secs: f64,
}

/// One crossfade between two adjacent streams.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionSegment {
    /// Left operand: frame 0 for the first transition, the previous
    /// blend output for every later one.
    pub from: StreamRef,
    /// Right operand: always the next frame input.
    pub to: StreamRef,
    /// This transition's output stream.
    pub out: StreamRef,
    pub fade_secs: f64,
}

/// The full synthesized graph for one animation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionGraph {
    pub holds: Vec<HoldSegment>,
    pub transitions: Vec<TransitionSegment>,
    pub policy: DurationPolicy,
}

impl TransitionGraph {
    /// Build the graph for `frame_count` frames.
    ///
    /// `frame_count` must be at least 1; the pipeline always has the
    /// composite as frame 0.
    pub fn build(frame_count: usize, policy: DurationPolicy) -> Self {
        debug_assert!(frame_count >= 1, "graph needs at least one frame");

        let holds = (0..frame_count)
            .map(|i| HoldSegment {
                input_index: i,
                duration_secs: policy.still_secs,
            })
            .collect();

        let transitions = (1..frame_count)
            .map(|i| TransitionSegment {
                from: if i == 1 {
                    StreamRef::Input(0)
                } else {
                    StreamRef::Blend(i - 1)
                },
                to: StreamRef::Input(i),
                out: StreamRef::Blend(i),
                fade_secs: policy.fade_secs,
            })
            .collect();

        Self {
            holds,
            transitions,
            policy,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.holds.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Total playable duration under this graph's policy.
    pub fn total_duration_secs(&self) -> f64 {
        let n = self.holds.len() as f64;
        let held = n * self.policy.still_secs;
        if self.policy.overlap {
            held - (n - 1.0).max(0.0) * self.policy.fade_secs
        } else {
            held
        }
    }

    // -----------------------------------------------------------------------
    // Serialization to ffmpeg arguments
    // -----------------------------------------------------------------------

    /// Per-frame input arguments: each frame is a looped still held for
    /// the policy's still duration.
    pub fn input_args(&self, frame_paths: &[&Path]) -> Vec<String> {
        debug_assert_eq!(frame_paths.len(), self.holds.len());

        let mut args = Vec::with_capacity(frame_paths.len() * 5);
        for (hold, path) in self.holds.iter().zip(frame_paths) {
            args.push("-loop".into());
            args.push("1".into());
            args.push("-t".into());
            args.push(format_secs(hold.duration_secs));
            args.push("-i".into());
            args.push(path.to_string_lossy().into_owned());
        }
        args
    }

    /// The `-filter_complex` expression.
    ///
    /// Each transition is a linear `blend` crossfade; the final stage
    /// always normalizes pixel format, scale, and frame rate so a
    /// single-frame graph still renders a valid clip.
    pub fn filter_complex(&self) -> String {
        let last = if self.transitions.is_empty() {
            StreamRef::Input(0)
        } else {
            self.transitions[self.transitions.len() - 1].out
        };

        let mut parts: Vec<String> = self
            .transitions
            .iter()
            .map(|t| {
                let fade = format_secs(t.fade_secs);
                format!(
                    "{}{}blend=all_expr='A*(1-T/{fade})+B*(T/{fade})':shortest=1:repeatlast=0,framestep=2{}",
                    t.from.label(),
                    t.to.label(),
                    t.out.label(),
                )
            })
            .collect();

        parts.push(format!(
            "{}format={OUTPUT_PIXEL_FORMAT},scale={OUTPUT_WIDTH}:-1:flags=lanczos,fps={OUTPUT_FPS}[vout]",
            last.label(),
        ));

        parts.join(";")
    }
}

/// Format a duration for an ffmpeg argument: integral values without a
/// trailing `.0`, fractional values as-is.
fn format_secs(secs: f64) -> String {
    if secs.fract() == 0.0 {
        format!("{}", secs as i64)
    } else {
        format!("{secs}")
    }
}
