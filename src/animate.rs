//! Animated GIF from one rendered frame per year.
//!
//! Frames are written as `frame_{year}.png`, read back in ascending year
//! order and encoded into a looping GIF. Frames are deleted only after the GIF
//! has been written; any failure leaves them on disk.

use crate::error::{Error, Result};
use crate::tidy::TidyTable;
use crate::viz;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationOptions {
    pub width: u32,
    pub height: u32,
    /// Playback rate in frames per second.
    pub fps: u32,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 840,
            fps: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationReport {
    /// Years in the order their frames were encoded.
    pub years: Vec<i32>,
    pub output: PathBuf,
    pub frames_removed: usize,
}

/// Upper bound on the number of years a single animation may cover.
pub const MAX_FRAMES: usize = 1_000;

/// Number of frames `[first, last]` produces, checked against [`MAX_FRAMES`].
pub fn frame_count(first: i32, last: i32) -> Result<usize> {
    if first > last {
        return Err(Error::EmptyRange { first, last });
    }
    usize::try_from(i64::from(last) - i64::from(first) + 1)
        .ok()
        .filter(|n| *n <= MAX_FRAMES)
        .ok_or(Error::RangeTooWide {
            first,
            last,
            max: MAX_FRAMES,
        })
}

pub fn frame_path(frame_dir: &Path, year: i32) -> PathBuf {
    frame_dir.join(format!("frame_{year}.png"))
}

/// Render one frame per year of `[first, last]`, ascending.
pub fn render_frames(
    table: &TidyTable,
    first: i32,
    last: i32,
    frame_dir: &Path,
    opts: &AnimationOptions,
) -> Result<Vec<PathBuf>> {
    let count = frame_count(first, last)?;
    fs::create_dir_all(frame_dir).map_err(|e| Error::io(frame_dir, e))?;

    let mut frames = Vec::with_capacity(count);
    for year in first..=last {
        let path = frame_path(frame_dir, year);
        let drawn = viz::plot_one_year(table, year, first, last, &path, opts.width, opts.height)
            .map_err(|e| Error::Render {
                path: path.clone(),
                message: format!("{e:#}"),
            })?;
        debug!("frame {year}: {drawn} markers");
        frames.push(path);
    }
    Ok(frames)
}

/// Encode `frames`, in order, into a looping GIF at `fps`.
///
/// The GIF is written next to `out` first and moved into place on success,
/// so a missing frame never leaves a partial animation.
pub fn assemble_gif(frames: &[PathBuf], out: &Path, fps: u32) -> Result<()> {
    if frames.is_empty() {
        return Err(Error::data_format(
            out.display().to_string(),
            "no frames to assemble",
        ));
    }
    let partial = out.with_extension("gif.part");
    if let Err(e) = encode_gif(frames, &partial, fps) {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }
    if let Err(e) = fs::rename(&partial, out) {
        let _ = fs::remove_file(&partial);
        return Err(Error::io(out, e));
    }
    info!("wrote {} ({} frames at {} fps)", out.display(), frames.len(), fps);
    Ok(())
}

fn encode_gif(frames: &[PathBuf], out: &Path, fps: u32) -> Result<()> {
    let file = File::create(out).map_err(|e| Error::io(out, e))?;
    let mut writer = BufWriter::new(file);
    write_gif(frames, &mut writer, fps, out)?;
    let file = writer
        .into_inner()
        .map_err(|e| Error::io(out, e.into_error()))?;
    file.sync_all().map_err(|e| Error::io(out, e))
}

/// Encode `frames` into `writer` and flush it. Write errors name `out`.
///
/// The encoder emits the GIF trailer on drop and discards any error there,
/// so it must be dropped before the flush.
fn write_gif<W: Write>(frames: &[PathBuf], mut writer: W, fps: u32, out: &Path) -> Result<()> {
    let mut encoder = GifEncoder::new_with_speed(&mut writer, 10);
    encoder.set_repeat(Repeat::Infinite)?;
    let delay = Delay::from_numer_denom_ms(1000, fps.max(1));
    for path in frames {
        let img = image::open(path)
            .map_err(|source| Error::Frame {
                path: path.clone(),
                source,
            })?
            .to_rgba8();
        encoder.encode_frame(Frame::from_parts(img, 0, 0, delay))?;
    }
    drop(encoder);
    writer.flush().map_err(|e| Error::io(out, e))
}

/// Delete the given frame files. Already-missing files are not an error.
pub fn remove_frames(frames: &[PathBuf]) -> Result<usize> {
    let mut removed = 0;
    for path in frames {
        match fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(path, e)),
        }
    }
    Ok(removed)
}

/// Render, assemble, then clean up the frames of `[first, last]`.
pub fn animate(
    table: &TidyTable,
    first: i32,
    last: i32,
    frame_dir: &Path,
    out: &Path,
    opts: &AnimationOptions,
) -> Result<AnimationReport> {
    frame_count(first, last)?;
    let frames = render_frames(table, first, last, frame_dir, opts)?;
    info!("rendered {} frames into {}", frames.len(), frame_dir.display());

    if let Err(e) = assemble_gif(&frames, out, opts.fps) {
        warn!(
            "animation failed; keeping {} frame(s) in {}",
            frames.len(),
            frame_dir.display()
        );
        return Err(e);
    }

    let frames_removed = remove_frames(&frames)?;
    debug!("removed {frames_removed} frame files");
    Ok(AnimationReport {
        years: (first..=last).collect(),
        output: out.to_path_buf(),
        frames_removed,
    })
}
