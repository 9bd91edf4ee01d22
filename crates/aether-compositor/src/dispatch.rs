//! Dispatch strategies for the sky atmosphere kernel.
//!
//! Both strategies evaluate [`shade_pixel`] for every output pixel and
//! differ only in how the work is scheduled. The full-screen strategy walks
//! the target on the frame thread; the tiled strategy splits it into
//! thread-group sized tiles and shades them on scoped worker threads, with
//! the frame thread writing finished tiles into the destination.

use std::str::FromStr;
use std::thread;

use aether_atmosphere::{AtmosphereUniform, ScatteringMedium};
use crossbeam_channel::unbounded;
use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::color::ColorBuffer;
use crate::error::CompositorError;
use crate::frame::FrameContext;

/// How the per-pixel kernel is scheduled over the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchStrategy {
    /// One full-screen pass on the frame thread.
    #[default]
    FullScreen,
    /// Thread-group sized tiles shaded in parallel.
    Tiled,
}

impl FromStr for DispatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "fullscreen" => Ok(Self::FullScreen),
            "tiled" | "compute" => Ok(Self::Tiled),
            _ => Err(format!(
                "unknown dispatch strategy '{s}' (expected 'full-screen' or 'tiled')"
            )),
        }
    }
}

/// Evaluate the atmosphere over one pixel and blend it onto `scene`.
///
/// Alpha passes through unchanged.
pub fn shade_pixel(
    x: u32,
    y: u32,
    frame: &FrameContext,
    medium: &ScatteringMedium,
    scene: [f32; 4],
) -> [f32; 4] {
    let view_dir = frame.camera.view_ray(x, y, frame.rt_size);
    let scatter = medium.scatter(view_dir, frame.light_dir());
    let rgb = scatter.composite(Vec3::new(scene[0], scene[1], scene[2]));
    [rgb.x, rgb.y, rgb.z, scene[3]]
}

/// Immutable per-frame inputs shared by every pixel.
///
/// Everything except the camera is read back from the bound
/// [`AtmosphereUniform`], so the kernel shades exactly what a shading
/// program would see.
#[derive(Debug, Clone, Copy)]
pub struct Kernel<'a> {
    frame: FrameContext,
    medium: ScatteringMedium,
    source: &'a ColorBuffer,
}

impl<'a> Kernel<'a> {
    /// Bind the kernel inputs. `source` must match the frame size.
    pub fn new(
        frame: &FrameContext,
        uniform: &AtmosphereUniform,
        eye_altitude: f32,
        source: &'a ColorBuffer,
    ) -> Result<Self, CompositorError> {
        check_size(frame, source)?;
        let frame = FrameContext {
            rt_size: Vec4::from_array(uniform.rt_size),
            main_light_dir: -uniform.light_dir(),
            ..*frame
        };
        Ok(Self {
            frame,
            medium: uniform.scattering_medium(eye_altitude),
            source,
        })
    }

    /// Shaded value of pixel `(x, y)`.
    pub fn shade(&self, x: u32, y: u32) -> [f32; 4] {
        shade_pixel(x, y, &self.frame, &self.medium, self.source.get(x, y))
    }
}

/// Shade every pixel of `dest` on the calling thread.
pub fn run_full_screen(kernel: &Kernel<'_>, dest: &mut ColorBuffer) -> Result<(), CompositorError> {
    check_size(&kernel.frame, dest)?;
    let width = kernel.frame.width;
    if width == 0 {
        return Ok(());
    }
    for (y, row) in dest.pixels_mut().chunks_exact_mut(width as usize).enumerate() {
        for (x, pixel) in row.iter_mut().enumerate() {
            *pixel = kernel.shade(x as u32, y as u32);
        }
    }
    Ok(())
}

/// A rectangle of pixels, `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Tile {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

/// Dispatch grid covering a target with thread groups.
///
/// The group count rounds up, so the last row and column of tiles may be
/// partial and are clipped to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub width: u32,
    pub height: u32,
    pub group_size: (u32, u32),
    pub groups_x: u32,
    pub groups_y: u32,
}

impl TileGrid {
    pub fn new(width: u32, height: u32, group_size: (u32, u32)) -> Self {
        let group_size = (group_size.0.max(1), group_size.1.max(1));
        Self {
            width,
            height,
            group_size,
            groups_x: width.div_ceil(group_size.0),
            groups_y: height.div_ceil(group_size.1),
        }
    }

    pub fn tile_count(&self) -> usize {
        self.groups_x as usize * self.groups_y as usize
    }

    /// Tiles in row-major group order.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        let (gx, gy) = self.group_size;
        (0..self.groups_y).flat_map(move |ty| {
            (0..self.groups_x).map(move |tx| {
                let x0 = tx * gx;
                let y0 = ty * gy;
                Tile {
                    x0,
                    y0,
                    x1: (x0 + gx).min(self.width),
                    y1: (y0 + gy).min(self.height),
                }
            })
        })
    }
}

struct ShadedTile {
    tile: Tile,
    pixels: Vec<[f32; 4]>,
}

fn shade_tile(kernel: &Kernel<'_>, tile: Tile) -> ShadedTile {
    let mut pixels = Vec::with_capacity(tile.width() as usize * tile.height() as usize);
    for y in tile.y0..tile.y1 {
        for x in tile.x0..tile.x1 {
            pixels.push(kernel.shade(x, y));
        }
    }
    ShadedTile { tile, pixels }
}

fn write_tile(dest: &mut ColorBuffer, shaded: &ShadedTile) {
    let width = dest.width() as usize;
    let tile = shaded.tile;
    let row_len = tile.width() as usize;
    if row_len == 0 {
        return;
    }
    let pixels = dest.pixels_mut();
    for (row, src) in shaded.pixels.chunks_exact(row_len).enumerate() {
        let start = (tile.y0 as usize + row) * width + tile.x0 as usize;
        pixels[start..start + row_len].copy_from_slice(src);
    }
}

/// Shade `dest` tile by tile on up to `workers` scoped threads.
///
/// `workers == 0` picks one worker per logical CPU. The worker count never
/// exceeds the number of tiles. If no worker thread can be started, the
/// tiles are shaded on the calling thread instead.
pub fn run_tiled(
    kernel: &Kernel<'_>,
    dest: &mut ColorBuffer,
    group_size: (u32, u32),
    workers: usize,
) -> Result<(), CompositorError> {
    check_size(&kernel.frame, dest)?;
    let grid = TileGrid::new(kernel.frame.width, kernel.frame.height, group_size);
    let tile_count = grid.tile_count();
    if tile_count == 0 {
        return Ok(());
    }

    let requested = if workers == 0 { num_cpus::get() } else { workers };
    let worker_count = requested.clamp(1, tile_count);
    tracing::debug!(
        tiles = tile_count,
        groups_x = grid.groups_x,
        groups_y = grid.groups_y,
        workers = worker_count,
        "dispatching sky atmosphere tiles"
    );

    let (task_sender, task_receiver) = unbounded::<Tile>();
    let (result_sender, result_receiver) = unbounded::<ShadedTile>();
    for tile in grid.tiles() {
        // The receiver is alive for the whole function, so this cannot fail.
        let _ = task_sender.send(tile);
    }
    drop(task_sender);

    thread::scope(|scope| {
        let mut spawned = 0;
        for index in 0..worker_count {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let spawn = thread::Builder::new()
                .name(format!("sky-tile-worker-{index}"))
                .spawn_scoped(scope, move || {
                    while let Ok(tile) = receiver.recv() {
                        if sender.send(shade_tile(kernel, tile)).is_err() {
                            break;
                        }
                    }
                });
            match spawn {
                Ok(_) => spawned += 1,
                Err(err) => {
                    tracing::warn!(%err, index, "failed to spawn tile worker");
                    break;
                }
            }
        }
        drop(result_sender);

        if spawned == 0 {
            while let Ok(tile) = task_receiver.try_recv() {
                write_tile(dest, &shade_tile(kernel, tile));
            }
        }
        for shaded in result_receiver.iter() {
            write_tile(dest, &shaded);
        }
    });

    Ok(())
}

fn check_size(frame: &FrameContext, buffer: &ColorBuffer) -> Result<(), CompositorError> {
    let expected = (frame.width, frame.height);
    if buffer.dimensions() != expected {
        return Err(CompositorError::SizeMismatch {
            expected,
            actual: buffer.dimensions(),
        });
    }
    Ok(())
}
