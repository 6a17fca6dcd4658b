use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use city_minimap::{
    log,
    city::{CityMap, CityView, CityViewport},
    config::{Configs, DemoConfigs, CONFIGS_DIR_PATH},
    minimap::{Minimap, MouseEvent},
    render::{RenderSystem, software::{PaletteAtlas, SoftwareRenderer}},
    utils::{self, Color, Size},
};

// ----------------------------------------------
// main()
// ----------------------------------------------

// Generates a sample city, draws its minimap into an image, then clicks
// the middle of the minimap and redraws with the moved viewport.
fn main() {
    let configs = DemoConfigs::load_file(Path::new(CONFIGS_DIR_PATH), "demo");
    log::configure(&configs.log);

    static PROBLEMS: AtomicU32 = AtomicU32::new(0);
    log::set_listener(|record| {
        if record.level >= log::Level::Warn {
            PROBLEMS.fetch_add(1, Ordering::Relaxed);
        }
    });

    log::info!(log::channel!("demo"), "City Minimap v{}", utils::version());

    let city = CityMap::generate(configs.seed, configs.map_size, configs.climate);
    let mut view = CityView::new(city.map_size(), configs.city_view_extent);

    let position = configs.minimap_position;
    let size_in_tiles = configs.minimap_size_in_tiles;
    let image_size = Size::new(
        position.x * 2 + size_in_tiles.width * 2,
        position.y * 2 + size_in_tiles.height,
    );

    let mut minimap = Minimap::new(configs.minimap.clone());
    let atlas = PaletteAtlas::new();
    let mut render_sys = SoftwareRenderer::new(image_size, Color::from_rgb(0x282828), &atlas);

    let draw = |minimap: &mut Minimap, render_sys: &mut SoftwareRenderer<'_>, view: &CityView| {
        let stats = minimap.draw(&city, view, render_sys, &atlas,
                                 position.x, position.y,
                                 size_in_tiles.width, size_in_tiles.height);
        log::info!(log::channel!("demo"), "Minimap: {stats:?}");
    };

    draw(&mut minimap, &mut render_sys, &view);

    let click = MouseEvent::left_click(
        position.x + size_in_tiles.width,
        position.y + size_in_tiles.height / 2,
    );

    let origin_before = view.scroll_origin();
    if minimap.handle_pointer_event(&mut view, &click) {
        log::info!(log::channel!("demo"), "Camera moved: {origin_before} -> {}", view.scroll_origin());
    } else {
        log::info!(log::channel!("demo"), "Click at {} did not hit the map.", click.position());
    }

    if minimap.needs_redraw() {
        draw(&mut minimap, &mut render_sys, &view);
    }

    log::info!(log::channel!("demo"), "Render stats: {:?}", render_sys.stats());

    match render_sys.save_png(&configs.output_image_path) {
        Ok(()) => log::info!(log::channel!("demo"), "Saved minimap to '{}'.", configs.output_image_path),
        Err(err) => log::error!(log::channel!("demo"), "{err}"),
    }

    let problems = PROBLEMS.load(Ordering::Relaxed);
    if problems != 0 {
        log::info!(log::channel!("demo"), "Finished with {problems} warnings or errors.");
    }
}
