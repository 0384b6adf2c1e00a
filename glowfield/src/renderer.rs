//! The tiled multithreaded renderer and its frame lifecycle.
//!
//! A [`Renderer`] owns one worker thread per logical CPU for the life of the process.
//! Each frame, the output raster is split into tiles; workers pop tiles from a shared
//! cursor and trace their pixels. The pixel grid may be read at any time for a
//! progressive preview — partially rendered frames show a mix of old and new pixels,
//! which is the intended behavior, and the grid is stable once [`Renderer::is_done`]
//! reports `true`.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::thread;

use crate::math::Rgb;
use crate::scene::Scene;

// -------------------------------------------------------------------------------------------------

/// Number of tiles generated per worker thread for each frame.
///
/// More tiles keep the preview responsive (smaller units of work to cancel or finish);
/// fewer tiles have less scheduling overhead.
pub const JOB_CORE_MULTIPLIER: u32 = if cfg!(debug_assertions) { 50 } else { 5 };

/// Pixel stride within a tile. Values above 1 render blocky previews faster by filling
/// each stride×stride cell with one traced color.
pub const INITIAL_STEP_SIZE: u32 = 1;

/// What a freshly allocated pixel grid is filled with, so a resized window shows a
/// neutral tone until the first frame lands.
const RESIZE_FILL_COLOR: Rgb = Rgb::new(0.5, 0.6, 0.7);

// -------------------------------------------------------------------------------------------------

/// A rectangular region of the output raster, processed as one unit of work.
#[derive(Debug)]
pub struct Tile {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    done: AtomicBool,
}

impl Tile {
    fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
            done: AtomicBool::new(false),
        }
    }

    /// Whether this tile's pixels have been produced (or the tile was cancelled).
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

/// Splits a `width`×`height` raster into approximately `jobs` square-ish tiles.
///
/// The tile grid is `e`×`e` where `e = max(1, floor(sqrt(jobs)))`, with the last row
/// and column clipped to the raster edge. A zero-area raster produces no tiles.
fn layout_tiles(width: u32, height: u32, jobs: u32) -> Vec<Arc<Tile>> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let edge = (jobs as f32).sqrt().floor().max(1.0) as u32;
    let h_step = (width / edge).max(1);
    let v_step = (height / edge).max(1);

    let mut tiles = Vec::new();
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            tiles.push(Arc::new(Tile::new(
                x,
                y,
                (x + h_step).min(width),
                (y + v_step).min(height),
            )));
            x += h_step;
        }
        y += v_step;
    }
    tiles
}

// -------------------------------------------------------------------------------------------------

/// One pixel's color, stored as raw f32 bits so that workers and the presenter can
/// share the grid without locking. All accesses are `Relaxed`: a reader racing a
/// writer sees some mix of old and new channels, never garbage.
struct PixelCell([AtomicU32; 3]);

impl PixelCell {
    fn new(color: Rgb) -> Self {
        Self([
            AtomicU32::new(color.red().to_bits()),
            AtomicU32::new(color.green().to_bits()),
            AtomicU32::new(color.blue().to_bits()),
        ])
    }

    #[inline]
    fn store(&self, color: Rgb) {
        self.0[0].store(color.red().to_bits(), Ordering::Relaxed);
        self.0[1].store(color.green().to_bits(), Ordering::Relaxed);
        self.0[2].store(color.blue().to_bits(), Ordering::Relaxed);
    }

    #[inline]
    fn load(&self) -> Rgb {
        Rgb::new(
            f32::from_bits(self.0[0].load(Ordering::Relaxed)),
            f32::from_bits(self.0[1].load(Ordering::Relaxed)),
            f32::from_bits(self.0[2].load(Ordering::Relaxed)),
        )
    }
}

/// The shared output raster: `width × height` colors in row-major order with the
/// origin at the top left.
///
/// Values are unclamped scene colors; convert with [`Rgb::to_srgb8`] (or
/// [`PixelGrid::to_rgba8`]) for display.
pub struct PixelGrid {
    width: u32,
    height: u32,
    cells: Box<[PixelCell]>,
}

impl PixelGrid {
    fn new(width: u32, height: u32, fill: Rgb) -> Self {
        let area = width as usize * height as usize;
        Self {
            width,
            height,
            cells: (0..area).map(|_| PixelCell::new(fill)).collect(),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reads the color at `(x, y)`. Panics if out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Rgb {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.cells[y as usize * self.width as usize + x as usize].load()
    }

    /// Snapshots the whole grid as 8-bit RGBA in row-major order, clamping each
    /// channel and setting alpha to 255.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.cells.len() * 4);
        for cell in &self.cells {
            let [r, g, b] = cell.load().to_srgb8();
            data.extend_from_slice(&[r, g, b, 255]);
        }
        data
    }

    /// Writes `color`, ignoring out-of-bounds coordinates.
    #[inline]
    fn set(&self, x: u32, y: u32, color: Rgb) {
        if x < self.width && y < self.height {
            self.cells[y as usize * self.width as usize + x as usize].store(color);
        }
    }
}

impl core::fmt::Debug for PixelGrid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelGrid")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive() // don't print the pixels
    }
}

// -------------------------------------------------------------------------------------------------

/// Builds a scene for the frame at time `time`; called once per frame by
/// [`Renderer::update`] on an already-cleared scene.
pub type SceneBuilderFn = Box<dyn Fn(&mut Scene, f32) + Send + Sync>;

/// The current frame's tiles plus the cursor workers pop from.
///
/// Guarded by a single mutex: the cursor advances under it, and [`Renderer::render_frame`]
/// swaps the whole list under it.
struct Jobs {
    tiles: Vec<Arc<Tile>>,
    next: usize,
}

/// State shared between the [`Renderer`] handle and its worker threads.
struct Shared {
    jobs: Mutex<Jobs>,
    /// Workers park here when the cursor reaches the end of the tile list.
    wakeup: Condvar,
    shutdown: AtomicBool,
    /// Read-locked by workers for the duration of a tile; write-locked by
    /// [`Renderer::update`] only between frames, when no worker holds a tile.
    scene: RwLock<Scene>,
    /// Read-locked by workers and the presenter; write-locked only by
    /// [`Renderer::resize`] after draining in-flight work.
    frame: RwLock<PixelGrid>,
}

impl Shared {
    /// Blocks until a tile is available or shutdown is flagged; `None` means shut down.
    fn next_tile(&self) -> Option<Arc<Tile>> {
        let mut jobs = self.jobs.lock().unwrap();
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                return None;
            }
            if jobs.next < jobs.tiles.len() {
                let tile = Arc::clone(&jobs.tiles[jobs.next]);
                jobs.next += 1;
                return Some(tile);
            }
            jobs = self.wakeup.wait(jobs).unwrap();
        }
    }
}

fn worker_loop(shared: &Shared) {
    while let Some(tile) = shared.next_tile() {
        let scene = shared.scene.read().unwrap();
        let frame = shared.frame.read().unwrap();
        render_tile(&scene, &frame, &tile);
        tile.done.store(true, Ordering::Release);
    }
}

/// Traces every pixel of `tile` in raster order and writes it to `frame`.
fn render_tile(scene: &Scene, frame: &PixelGrid, tile: &Tile) {
    let step = INITIAL_STEP_SIZE;
    let mut y = tile.min_y;
    while y < tile.max_y {
        let mut x = tile.min_x;
        while x < tile.max_x {
            let color = scene.color_at_pixel(x, y);
            for j in 0..step {
                for i in 0..step {
                    frame.set(x + i, y + j, color);
                }
            }
            x += step;
        }
        y += step;
    }
}

// -------------------------------------------------------------------------------------------------

/// The renderer: a persistent worker pool plus the double-buffered frame lifecycle.
///
/// The intended steady-state loop, driven by a presentation timer:
///
/// ```no_run
/// use glowfield::renderer::Renderer;
///
/// let mut renderer = Renderer::new(Box::new(glowfield::demo::build_scene));
/// renderer.resize(640, 480);
/// loop {
///     if renderer.is_done() {
///         renderer.update(0.1);
///         renderer.render_frame();
///     }
///     present(&renderer.frame().to_rgba8());
///     # fn present(_: &[u8]) {}
///     # break;
/// }
/// ```
pub struct Renderer {
    shared: Arc<Shared>,
    workers: Vec<thread::JoinHandle<()>>,
    builder: SceneBuilderFn,
    time: f32,
    parallelism: u32,
}

impl Renderer {
    /// Creates a renderer with one worker per logical CPU.
    ///
    /// `builder` is invoked by [`Renderer::update`] to populate the scene for each
    /// frame. The pixel grid starts at 0×0; call [`Renderer::resize`] before rendering.
    pub fn new(builder: SceneBuilderFn) -> Self {
        let parallelism = thread::available_parallelism().map_or(1, |n| n.get() as u32);
        Self::with_parallelism(parallelism, builder)
    }

    /// Creates a renderer with an explicit worker count.
    ///
    /// The worker count also determines the tile layout
    /// (see [`JOB_CORE_MULTIPLIER`]), so pinning it makes frame schedules
    /// reproducible across machines; tests and benchmarks want that.
    pub fn with_parallelism(parallelism: u32, builder: SceneBuilderFn) -> Self {
        let parallelism = parallelism.max(1);
        let shared = Arc::new(Shared {
            jobs: Mutex::new(Jobs {
                tiles: Vec::new(),
                next: 0,
            }),
            wakeup: Condvar::new(),
            shutdown: AtomicBool::new(false),
            scene: RwLock::new(Scene::new()),
            frame: RwLock::new(PixelGrid::new(0, 0, RESIZE_FILL_COLOR)),
        });

        log::debug!("starting {parallelism} render worker threads");
        let workers = (0..parallelism)
            .map(|i| {
                let shared = Arc::clone(&shared);
                thread::Builder::new()
                    .name(format!("glowfield-render-{i}"))
                    .spawn(move || worker_loop(&shared))
                    .expect("failed to spawn render worker thread")
            })
            .collect();

        Self {
            shared,
            workers,
            builder,
            time: 0.0,
            parallelism,
        }
    }

    /// Whether every tile of the current frame has been rendered (or cancelled).
    /// Trivially `true` before the first [`Renderer::render_frame`].
    pub fn is_done(&self) -> bool {
        let jobs = self.shared.jobs.lock().unwrap();
        jobs.tiles.iter().all(|tile| tile.is_done())
    }

    /// Advances time by `dt` seconds and rebuilds the scene for the new time.
    ///
    /// No-op while a frame is in flight: the scene must not change under the workers.
    pub fn update(&mut self, dt: f32) {
        if !self.is_done() {
            return;
        }
        self.time += dt;

        let (width, height) = self.size();
        let mut scene = self.shared.scene.write().unwrap();
        scene.clear();
        (self.builder)(&mut scene, self.time);
        scene.set_scene_size(width, height);
    }

    /// Enqueues the tiles for a new frame and wakes the workers.
    ///
    /// No-op while a frame is in flight.
    pub fn render_frame(&mut self) {
        if !self.is_done() {
            return;
        }
        let (width, height) = self.size();
        {
            let mut jobs = self.shared.jobs.lock().unwrap();
            jobs.tiles = layout_tiles(width, height, self.parallelism * JOB_CORE_MULTIPLIER);
            jobs.next = 0;
            log::trace!(
                "enqueued {} tiles for a {width}×{height} frame",
                jobs.tiles.len()
            );
        }
        self.shared.wakeup.notify_all();
    }

    /// Abandons the current frame: tiles not yet started are marked done without
    /// rendering, and this call blocks until in-flight tiles finish.
    ///
    /// Cancelled regions keep their previous pixels; the next frame overwrites them.
    pub fn cancel(&self) {
        {
            let mut jobs = self.shared.jobs.lock().unwrap();
            while jobs.next < jobs.tiles.len() {
                jobs.tiles[jobs.next].done.store(true, Ordering::Release);
                jobs.next += 1;
            }
        }
        // Workers currently on a tile finish that tile; there is no mid-tile
        // interruption.
        while !self.is_done() {
            thread::yield_now();
        }
    }

    /// Changes the output size, cancelling and draining any in-flight frame first.
    ///
    /// A zero dimension is ignored entirely. If the size actually changed, the pixel
    /// grid is reallocated and filled with a neutral color.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if !self.is_done() {
            self.cancel();
        }
        {
            let mut frame = self.shared.frame.write().unwrap();
            if frame.width() != width || frame.height() != height {
                log::debug!("resizing pixel grid to {width}×{height}");
                *frame = PixelGrid::new(width, height, RESIZE_FILL_COLOR);
            }
        }
        self.shared.scene.write().unwrap().set_scene_size(width, height);
    }

    /// The pixel grid. Holding the returned guard does not block rendering, only
    /// [`Renderer::resize`].
    pub fn frame(&self) -> impl core::ops::Deref<Target = PixelGrid> + '_ {
        self.shared.frame.read().unwrap()
    }

    /// Current output size in pixels.
    pub fn size(&self) -> (u32, u32) {
        let frame = self.shared.frame.read().unwrap();
        (frame.width(), frame.height())
    }

    /// The accumulated scene time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Number of tiles in the current frame's schedule.
    pub fn tile_count(&self) -> usize {
        self.shared.jobs.lock().unwrap().tiles.len()
    }
}

impl core::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Renderer")
            .field("parallelism", &self.parallelism)
            .field("time", &self.time)
            .field("is_done", &self.is_done())
            .finish_non_exhaustive()
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        {
            // Flag shutdown while holding the job mutex so a worker between its check
            // and its wait cannot miss the wakeup.
            let _jobs = self.shared.jobs.lock().unwrap();
            self.shared.shutdown.store(true, Ordering::Release);
        }
        self.shared.wakeup.notify_all();
        for handle in self.workers.drain(..) {
            if let Err(panic) = handle.join() {
                // A worker panic is fatal; surface it on the presentation thread.
                std::panic::resume_unwind(panic);
            }
        }
    }
}
