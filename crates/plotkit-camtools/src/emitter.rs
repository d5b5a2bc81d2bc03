//! Toolpath Emitter
//!
//! Turns flattened segments into an ordered list of [`MachineCommand`]s for a
//! given [`MachineProfile`]. The emitter is a small state machine: preamble,
//! any number of segments, postamble. Coordinates pass through the profile's
//! forward kinematics, so the same code drives both gantry and string
//! plotters.

use crate::command::MachineCommand;
use crate::error::{CamToolError, CamToolResult};
use crate::flattener::{fit_scale, FlatSegment, PathFlattener};
use plotkit_core::{Kinematics, KinematicsModel, MachineProfile, Point, VectorPath};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Emitter lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterState {
    Idle,
    PreambleEmitted,
    PenUp,
    PenDown,
    PostambleEmitted,
    Done,
}

impl fmt::Display for EmitterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::PreambleEmitted => "preamble-emitted",
            Self::PenUp => "pen-up",
            Self::PenDown => "pen-down",
            Self::PostambleEmitted => "postamble-emitted",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Counters collected while emitting
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolpathStats {
    pub segments: usize,
    pub lifts: usize,
    pub moves: usize,
    pub scale: f64,
}

/// A complete toolpath program
#[derive(Debug, Clone, PartialEq)]
pub struct Toolpath {
    pub commands: Vec<MachineCommand>,
    pub stats: ToolpathStats,
}

impl Toolpath {
    /// Serialize as G-code text, one command per line
    pub fn to_gcode(&self) -> String {
        let mut gcode = String::new();
        for command in &self.commands {
            gcode.push_str(&command.to_string());
            gcode.push('\n');
        }
        gcode
    }

    /// Stream the program to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> CamToolResult<()> {
        for command in &self.commands {
            writeln!(writer, "{}", command)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the program to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> CamToolResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))?;
        info!(
            "Wrote {} commands to {}",
            self.commands.len(),
            path.display()
        );
        Ok(())
    }
}

/// Stateful G-code emitter for one machine profile
#[derive(Debug)]
pub struct ToolpathEmitter {
    profile: MachineProfile,
    kinematics: KinematicsModel,
    state: EmitterState,
    commands: Vec<MachineCommand>,
    last_native: Option<(f64, f64)>,
    stats: ToolpathStats,
}

impl ToolpathEmitter {
    /// Create an emitter, validating the profile first
    pub fn new(profile: MachineProfile) -> CamToolResult<Self> {
        profile.validate()?;
        let kinematics = profile.kinematics();
        Ok(Self {
            profile,
            kinematics,
            state: EmitterState::Idle,
            commands: Vec::new(),
            last_native: None,
            stats: ToolpathStats {
                scale: 1.0,
                ..Default::default()
            },
        })
    }

    pub fn state(&self) -> EmitterState {
        self.state
    }

    pub fn stats(&self) -> ToolpathStats {
        self.stats
    }

    /// Record the fit scale in the program header and statistics
    pub fn set_scale(&mut self, scale: f64) {
        self.stats.scale = scale;
    }

    fn invalid(&self, operation: &str) -> CamToolError {
        CamToolError::InvalidState {
            state: self.state.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Emit header comments and the preamble, leaving the pen raised
    pub fn begin(&mut self) -> CamToolResult<()> {
        if self.state != EmitterState::Idle {
            return Err(self.invalid("begin"));
        }

        let profile = &self.profile;
        let header = [
            "plotkit pen plotter toolpath".to_string(),
            format!("Machine: {}", profile.kind),
            format!(
                "Canvas: {:.1} x {:.1}",
                profile.canvas_width, profile.canvas_height
            ),
            format!("Scale: {:.5}", self.stats.scale),
            format!(
                "Touch height: {:.3}, lift height: {:.3}",
                profile.touch_height,
                profile.lift_height()
            ),
        ];
        self.commands
            .extend(header.into_iter().map(MachineCommand::Comment));

        let feed = profile.feed_rate;
        let lift = profile.lift_height();
        self.commands.extend([
            MachineCommand::raw("G91 ; Relative mode for the initial pen lift"),
            MachineCommand::raw("G1 Z20 ; Lift head by 20"),
            MachineCommand::raw("G90 ; Absolute positioning"),
            MachineCommand::raw("M107 ; Fan off"),
            MachineCommand::raw("M190 S0 ; Bed heater off"),
            MachineCommand::raw("M104 S0 ; Nozzle heater off"),
            MachineCommand::raw("G28 ; Home all axes"),
            MachineCommand::raw(format!("G0 F{} ; Set the feed rate", feed)),
            MachineCommand::PenUp { z: lift },
        ]);

        self.state = EmitterState::PreambleEmitted;
        debug!("Preamble emitted for {} machine", self.profile.kind);
        Ok(())
    }

    fn push_move(&mut self, point: Point) {
        let (a, b) = self.kinematics.to_native(point);
        self.commands.push(MachineCommand::Move { a, b });
        self.last_native = Some((a, b));
        self.stats.moves += 1;
    }

    fn pen_up(&mut self) {
        // The preamble already leaves the pen at lift height.
        if self.state == EmitterState::PenDown {
            self.commands.push(MachineCommand::PenUp {
                z: self.profile.lift_height(),
            });
        }
        self.state = EmitterState::PenUp;
    }

    fn pen_down(&mut self) {
        self.commands.push(MachineCommand::PenDown {
            z: self.profile.touch_height,
        });
        self.state = EmitterState::PenDown;
    }

    /// Emit one flattened segment
    ///
    /// A continuous segment arriving while the pen is raised is treated as a
    /// lift, since nothing would otherwise lower the pen.
    pub fn segment(&mut self, segment: &FlatSegment) -> CamToolResult<()> {
        match self.state {
            EmitterState::PreambleEmitted | EmitterState::PenUp | EmitterState::PenDown => {}
            _ => return Err(self.invalid("emit a segment")),
        }

        let lift = segment.lift || self.state != EmitterState::PenDown;
        if lift {
            self.pen_up();
            self.push_move(segment.start);
            self.pen_down();
            self.stats.lifts += 1;
        } else {
            self.commands.push(MachineCommand::comment("continue stroke"));
            let start = self.kinematics.to_native(segment.start);
            if self.last_native != Some(start) {
                self.push_move(segment.start);
            }
        }

        for point in &segment.points {
            self.push_move(*point);
        }
        self.stats.segments += 1;
        Ok(())
    }

    /// Emit the postamble: park the pen, home X/Y and release the motors
    pub fn finish(&mut self) -> CamToolResult<()> {
        match self.state {
            EmitterState::PreambleEmitted | EmitterState::PenUp | EmitterState::PenDown => {}
            _ => return Err(self.invalid("finish")),
        }

        let profile = &self.profile;
        self.commands.extend([
            MachineCommand::raw(format!(
                "G1 Z{} F{} ; Raise the pen for capping",
                profile.park_height, profile.park_feed_rate
            )),
            MachineCommand::raw("M104 S0 ; Nozzle heater off"),
            MachineCommand::raw("G28 X0 Y0 ; Home X and Y"),
            MachineCommand::raw("M84 ; Motors off"),
        ]);
        self.state = EmitterState::PostambleEmitted;
        Ok(())
    }

    /// Take the finished program out of the emitter
    pub fn take_toolpath(&mut self) -> CamToolResult<Toolpath> {
        if self.state != EmitterState::PostambleEmitted {
            return Err(self.invalid("take the toolpath"));
        }
        self.state = EmitterState::Done;
        Ok(Toolpath {
            commands: std::mem::take(&mut self.commands),
            stats: self.stats,
        })
    }

    /// Fit, flatten and emit a whole path set in one go
    ///
    /// An empty path set is not an error: the program holds only the
    /// preamble and postamble.
    pub fn emit_paths(profile: &MachineProfile, paths: &[VectorPath]) -> CamToolResult<Toolpath> {
        if paths.iter().all(VectorPath::is_empty) {
            warn!("No paths to emit, writing an empty program");
        }

        let mut emitter = Self::new(profile.clone())?;
        let scale = fit_scale(paths, profile.canvas_width, profile.canvas_height);
        emitter.set_scale(scale);
        emitter.begin()?;

        let mut flattener = PathFlattener::new(profile.flatten);
        for path in paths {
            for segment in flattener.flatten_path(path, scale) {
                emitter.segment(&segment)?;
            }
        }

        emitter.finish()?;
        let toolpath = emitter.take_toolpath()?;
        info!(
            "Emitted {} segments ({} lifts, {} moves) at scale {:.5}",
            toolpath.stats.segments, toolpath.stats.lifts, toolpath.stats.moves, scale
        );
        Ok(toolpath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flattener::SegmentKind;

    fn flat(start: (f64, f64), end: (f64, f64), lift: bool) -> FlatSegment {
        FlatSegment {
            kind: SegmentKind::Line,
            start: start.into(),
            points: vec![end.into()],
            lift,
        }
    }

    #[test]
    fn test_state_transitions() {
        let mut emitter = ToolpathEmitter::new(MachineProfile::default()).unwrap();
        assert_eq!(emitter.state(), EmitterState::Idle);
        assert!(emitter.segment(&flat((0.0, 0.0), (1.0, 1.0), true)).is_err());
        assert!(emitter.finish().is_err());

        emitter.begin().unwrap();
        assert_eq!(emitter.state(), EmitterState::PreambleEmitted);
        assert!(emitter.begin().is_err());

        emitter.segment(&flat((0.0, 0.0), (1.0, 1.0), true)).unwrap();
        assert_eq!(emitter.state(), EmitterState::PenDown);

        emitter.finish().unwrap();
        assert_eq!(emitter.state(), EmitterState::PostambleEmitted);
        assert!(emitter.segment(&flat((0.0, 0.0), (1.0, 1.0), true)).is_err());

        emitter.take_toolpath().unwrap();
        assert_eq!(emitter.state(), EmitterState::Done);
        assert!(matches!(
            emitter.take_toolpath(),
            Err(CamToolError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let profile = MachineProfile {
            feed_rate: 0.0,
            ..MachineProfile::default()
        };
        assert!(matches!(
            ToolpathEmitter::new(profile),
            Err(CamToolError::Profile(_))
        ));
    }

    #[test]
    fn test_continuous_segment_skips_duplicate_start() {
        let mut emitter = ToolpathEmitter::new(MachineProfile::default()).unwrap();
        emitter.begin().unwrap();
        emitter.segment(&flat((0.0, 0.0), (10.0, 0.0), true)).unwrap();
        let before = emitter.stats().moves;
        emitter.segment(&flat((10.0, 0.0), (20.0, 0.0), false)).unwrap();
        assert_eq!(emitter.stats().moves, before + 1);
        assert_eq!(emitter.stats().lifts, 1);
    }

    #[test]
    fn test_continuous_segment_while_pen_up_lifts() {
        let mut emitter = ToolpathEmitter::new(MachineProfile::default()).unwrap();
        emitter.begin().unwrap();
        emitter.segment(&flat((0.0, 0.0), (10.0, 0.0), false)).unwrap();
        assert_eq!(emitter.stats().lifts, 1);
        assert_eq!(emitter.state(), EmitterState::PenDown);
    }

    #[test]
    fn test_write_failure_propagates() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let toolpath = ToolpathEmitter::emit_paths(&MachineProfile::default(), &[]).unwrap();
        assert!(matches!(
            toolpath.write_to(Broken),
            Err(CamToolError::IoError(_))
        ));
    }
}
