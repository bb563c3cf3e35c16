//! WAV file input and output.

use crate::audio::recorder::AudioSource;
use crate::error::{Result, VoxlpcError};
use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;
use std::time::Instant;

/// Samples handed out per `read_samples` call.
const READ_CHUNK: usize = 1024;

/// Audio source that reads a mono WAV file into memory.
///
/// Integer formats are scaled to `[-1, 1)`. Multi-channel files are
/// rejected rather than mixed down.
///
/// By default reads return as fast as they are called. A paced source
/// releases samples no faster than its sample rate, counted from `start()`,
/// the way a live device would.
pub struct WavAudioSource {
    samples: Vec<f32>,
    sample_rate: u32,
    position: usize,
    chunk_size: usize,
    paced: bool,
    started: Option<Instant>,
}

impl WavAudioSource {
    /// Create from any reader (for testing/flexibility).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut wav_reader = hound::WavReader::new(reader)?;
        let spec = wav_reader.spec();

        if spec.channels != 1 {
            return Err(VoxlpcError::AudioFormatMismatch {
                expected: "1 channel".to_string(),
                actual: format!("{} channels", spec.channels),
            });
        }

        let samples = match spec.sample_format {
            hound::SampleFormat::Float => wav_reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                wav_reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        tracing::debug!(
            samples = samples.len(),
            sample_rate = spec.sample_rate,
            bits = spec.bits_per_sample,
            "loaded WAV"
        );

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            position: 0,
            chunk_size: READ_CHUNK,
            paced: false,
            started: None,
        })
    }

    /// Releases samples at the file's sample rate instead of all at once.
    pub fn with_realtime(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    /// Samples that may have been read by now.
    fn available(&mut self) -> usize {
        if !self.paced {
            return self.samples.len();
        }
        let started = *self.started.get_or_insert_with(Instant::now);
        let due = started.elapsed().as_secs_f64() * self.sample_rate as f64;
        (due as usize).min(self.samples.len())
    }

    /// Open a WAV file from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Consume the source and return all samples as a single buffer.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl AudioSource for WavAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.paced {
            self.started = Some(Instant::now());
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.started = None;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<f32>> {
        let available = self.available();
        if self.position >= available {
            return Ok(Vec::new());
        }

        let end = std::cmp::min(self.position + self.chunk_size, available);
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(chunk)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_exhausted(&self) -> bool {
        self.position >= self.samples.len()
    }
}

/// Writes mono 16-bit PCM. Samples outside `[-1, 1]` are clipped.
pub fn write_wav<W: Write + Seek>(writer: W, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut wav_writer = hound::WavWriter::new(writer, spec)?;
    for &sample in samples {
        let clipped = sample.clamp(-1.0, 1.0);
        wav_writer.write_sample((clipped * i16::MAX as f32) as i16)?;
    }
    wav_writer.finalize()?;
    Ok(())
}

/// Writes mono 16-bit PCM to `path`, creating or truncating it.
pub fn write_wav_file(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let file = File::create(path)?;
    write_wav(std::io::BufWriter::new(file), samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn make_wav_data(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn from_reader_scales_int16_to_unit_range() {
        let data = make_wav_data(22050, 1, &[0, 16384, -32768]);
        let source = WavAudioSource::from_reader(Cursor::new(data)).unwrap();
        assert_eq!(source.sample_rate(), 22050);
        assert_eq!(source.into_samples(), vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn from_reader_rejects_stereo() {
        let data = make_wav_data(22050, 2, &[0, 0, 1, 1]);
        match WavAudioSource::from_reader(Cursor::new(data)) {
            Err(VoxlpcError::AudioFormatMismatch { actual, .. }) => {
                assert_eq!(actual, "2 channels");
            }
            _ => panic!("Expected AudioFormatMismatch"),
        }
    }

    #[test]
    fn from_reader_reads_float_wav() {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        writer.write_sample(0.25f32).unwrap();
        writer.write_sample(-0.75f32).unwrap();
        writer.finalize().unwrap();

        let source = WavAudioSource::from_reader(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(source.into_samples(), vec![0.25, -0.75]);
    }

    #[test]
    fn read_samples_returns_chunks_then_empty() {
        let data = make_wav_data(22050, 1, &vec![100i16; 2500]);
        let mut source = WavAudioSource::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(source.read_samples().unwrap().len(), 1024);
        assert_eq!(source.read_samples().unwrap().len(), 1024);
        assert!(!source.is_exhausted());
        assert_eq!(source.read_samples().unwrap().len(), 452);
        assert!(source.is_exhausted());
        assert!(source.read_samples().unwrap().is_empty());
    }

    #[test]
    fn realtime_source_releases_samples_at_sample_rate() {
        // 2205 samples at 22050 Hz are 100 ms of audio
        let data = make_wav_data(22050, 1, &vec![100i16; 2205]);
        let mut source = WavAudioSource::from_reader(Cursor::new(data))
            .unwrap()
            .with_realtime(true);

        let begin = std::time::Instant::now();
        source.start().unwrap();
        let first = source.read_samples().unwrap();
        assert!(first.len() < 2205);

        let mut total = first.len();
        while !source.is_exhausted() {
            total += source.read_samples().unwrap().len();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(total, 2205);
        assert!(begin.elapsed() >= std::time::Duration::from_millis(90));
    }

    #[test]
    fn unpaced_source_is_available_at_once() {
        let data = make_wav_data(22050, 1, &vec![100i16; 2205]);
        let mut source = WavAudioSource::from_reader(Cursor::new(data))
            .unwrap()
            .with_realtime(false);
        source.start().unwrap();

        let mut total = 0;
        while !source.is_exhausted() {
            total += source.read_samples().unwrap().len();
        }
        assert_eq!(total, 2205);
    }

    #[test]
    fn invalid_wav_data_returns_error() {
        let result = WavAudioSource::from_reader(Cursor::new(b"not a wav file".to_vec()));
        assert!(matches!(result, Err(VoxlpcError::Wav(_))));
    }

    #[test]
    fn write_then_read_preserves_length_and_rate() {
        let samples: Vec<f32> = (0..300).map(|n| (n as f32 / 300.0) - 0.5).collect();
        let mut cursor = Cursor::new(Vec::new());
        write_wav(&mut cursor, &samples, 16000).unwrap();

        let source = WavAudioSource::from_reader(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(source.sample_rate(), 16000);
        let read = source.into_samples();
        assert_eq!(read.len(), 300);
        for (a, b) in samples.iter().zip(&read) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn write_wav_clips_out_of_range_samples() {
        let mut cursor = Cursor::new(Vec::new());
        write_wav(&mut cursor, &[4.0, -4.0], 8000).unwrap();
        let read = WavAudioSource::from_reader(Cursor::new(cursor.into_inner()))
            .unwrap()
            .into_samples();
        assert!((read[0] - 1.0).abs() < 1e-3);
        assert!((read[1] + 1.0).abs() < 1e-3);
    }

    #[test]
    fn write_wav_file_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        write_wav_file(&path, &[0.0; 64], 22050).unwrap();
        let source = WavAudioSource::open(&path).unwrap();
        assert_eq!(source.len(), 64);
    }
}
