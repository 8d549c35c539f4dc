//! Sound level meter.
//!
//! Produces one non-negative amplitude per poll tick from one of two
//! backends:
//!
//! * **Simulated** reads a static `AtomicU32` holding the bits of an `f32`,
//!   injected with [`sim_set_amplitude`].  Used by tests and demos.
//! * **PCM capture file** reads raw signed 16-bit little-endian mono
//!   samples.  Each reading consumes one window of samples and reports the
//!   peak magnitude divided by `amplitude_scale`.  The file rewinds at EOF
//!   so a short recording loops forever.

use core::sync::atomic::{AtomicU32, Ordering};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::app::ports::AmplitudeSource;
use crate::error::SensorError;

static SIM_AMPLITUDE: AtomicU32 = AtomicU32::new(0);

pub fn sim_set_amplitude(amplitude: f32) {
    SIM_AMPLITUDE.store(amplitude.to_bits(), Ordering::Relaxed);
}

fn sim_amplitude() -> f32 {
    f32::from_bits(SIM_AMPLITUDE.load(Ordering::Relaxed))
}

/// Samples per reading: 100 ms at 44.1 kHz.
pub const PCM_WINDOW_SAMPLES: usize = 4_410;

#[derive(Debug, Clone)]
pub enum MeterBackend {
    Simulated,
    PcmFile(PathBuf),
}

pub struct SoundMeter {
    backend: MeterBackend,
    scale: f32,
    reader: Option<BufReader<File>>,
    running: bool,
    window: Vec<u8>,
    total_starts: u32,
}

impl SoundMeter {
    pub fn new(backend: MeterBackend, amplitude_scale: f32) -> Self {
        Self {
            backend,
            scale: amplitude_scale,
            reader: None,
            running: false,
            window: vec![0; PCM_WINDOW_SAMPLES * 2],
            total_starts: 0,
        }
    }

    pub fn simulated(amplitude_scale: f32) -> Self {
        Self::new(MeterBackend::Simulated, amplitude_scale)
    }

    /// Divisor from raw peak to amplitude units.  Applies from the next
    /// reading.
    pub fn set_scale(&mut self, amplitude_scale: f32) {
        self.scale = amplitude_scale;
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn total_starts(&self) -> u32 {
        self.total_starts
    }

    fn open_capture(&mut self) -> Result<(), SensorError> {
        let MeterBackend::PcmFile(path) = &self.backend else {
            return Ok(());
        };
        let file = File::open(path).map_err(|e| {
            warn!("SoundMeter: cannot open {}: {}", path.display(), e);
            SensorError::Io
        })?;
        info!("SoundMeter: capturing from {}", path.display());
        self.reader = Some(BufReader::new(file));
        Ok(())
    }

    fn read_window_peak(&mut self) -> f32 {
        let Some(reader) = self.reader.as_mut() else {
            return 0.0;
        };

        let filled = match fill_window(reader, &mut self.window) {
            Ok(0) => {
                // EOF: loop the recording.
                if reader.seek(SeekFrom::Start(0)).is_err() {
                    return 0.0;
                }
                fill_window(reader, &mut self.window).unwrap_or(0)
            }
            Ok(n) => n,
            Err(e) => {
                debug!("SoundMeter: read failed: {}", e);
                0
            }
        };

        let peak = self.window[..filled - filled % 2]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]).unsigned_abs())
            .max()
            .unwrap_or(0);

        if self.scale <= 0.0 {
            return 0.0;
        }
        peak as f32 / self.scale
    }
}

/// Read until `buf` is full or the stream ends.  Returns bytes read.
fn fill_window(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl AmplitudeSource for SoundMeter {
    fn start(&mut self) -> Result<(), SensorError> {
        if self.running {
            return Err(SensorError::InvalidState);
        }
        self.open_capture()?;
        self.running = true;
        self.total_starts = self.total_starts.saturating_add(1);
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
        self.reader = None;
    }

    fn amplitude(&mut self) -> f32 {
        if !self.running {
            return 0.0;
        }
        match self.backend {
            MeterBackend::Simulated => sim_amplitude().max(0.0),
            MeterBackend::PcmFile(_) => self.read_window_peak(),
        }
    }
}
