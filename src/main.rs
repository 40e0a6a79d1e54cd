use std::env;
use std::fs;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use futures_util::FutureExt;
use glam::{Vec2, Vec3};
use pollster::block_on;

use storybook_runtime::assets::{AssetError, AssetLoader, LoadedAsset};
use storybook_runtime::audio::{AudioOutput, AudioSink, PlaybackRejected};
use storybook_runtime::{
    parse_pages, AnimationClip, CameraParams, ModelNode, Page, PageId, SceneModel, StaticViewport,
    Storybook,
};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let xml = fs::read_to_string(&options.pages_path)
        .with_context(|| format!("failed to read {}", options.pages_path))?;
    let pages = parse_pages(&xml).context("failed to parse page list")?;

    println!("Loaded storybook with {} pages", pages.len());
    for page in &pages {
        println!(" - {}: {}", page.id, page.model_path);
    }

    let audio = SilentOutput;
    let book = Storybook::new(
        pages.clone(),
        Arc::new(StubLoader),
        &audio,
        Arc::new(StaticViewport::new(1280, 720)),
    );

    if let Some(script_path) = &options.script_path {
        let script = fs::read_to_string(script_path)
            .with_context(|| format!("failed to read {script_path}"))?;
        replay(&book, &script)?;
    }

    print_final_state(&book, &pages);
    Ok(())
}

fn replay(book: &Storybook, script: &str) -> Result<()> {
    let camera = CameraParams::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 60.0, 1280.0 / 720.0);
    let mut replayed = 0usize;
    for (index, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        apply_event(book, &camera, line)
            .with_context(|| format!("invalid event on line {}", index + 1))?;
        replayed += 1;
    }
    println!("Replayed {replayed} events");
    Ok(())
}

fn apply_event(book: &Storybook, camera: &CameraParams, line: &str) -> Result<()> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or_default();
    match verb {
        "found" => {
            let id = parse_page_id(parts.next())?;
            block_on(book.marker_found(id));
            println!("found {id}");
        }
        "lost" => {
            let id = parse_page_id(parts.next())?;
            book.marker_lost(id);
            println!("lost {id}");
        }
        "tick" => {
            let delta = parts
                .next()
                .ok_or_else(|| anyhow!("tick needs a duration"))?
                .parse::<f32>()
                .map_err(|err| anyhow!("failed to parse tick duration: {err}"))?;
            book.tick(delta);
        }
        "tap" => {
            let x = parse_coord(parts.next())?;
            let y = parse_coord(parts.next())?;
            let hit = book.pointer_down(Vec2::new(x, y), camera);
            println!("tap ({x}, {y}) -> {}", if hit { "hit" } else { "miss" });
        }
        other => return Err(anyhow!("unknown event: {other}")),
    }
    Ok(())
}

fn parse_page_id(value: Option<&str>) -> Result<PageId> {
    let raw = value.ok_or_else(|| anyhow!("event needs a page id"))?;
    let id = raw
        .parse::<u32>()
        .map_err(|err| anyhow!("failed to parse page id: {err}"))?;
    Ok(PageId(id))
}

fn parse_coord(value: Option<&str>) -> Result<f32> {
    value
        .ok_or_else(|| anyhow!("tap needs x and y coordinates"))?
        .parse::<f32>()
        .map_err(|err| anyhow!("failed to parse coordinate: {err}"))
}

fn print_final_state(book: &Storybook, pages: &[Page]) {
    println!("Final page states:");
    for page in pages {
        let Some(controller) = book.controller(page.id) else {
            continue;
        };
        let state = if controller.is_active() { "active" } else { "idle" };
        println!(" - {}: {state}", page.id);
    }
    match book.registry().current() {
        Some(entry) => {
            let owner = pages.iter().find(|page| {
                book.controller(page.id)
                    .and_then(|c| c.active_asset())
                    .is_some_and(|asset| Arc::ptr_eq(&asset, &entry.model))
            });
            match owner {
                Some(page) => println!("Registry holds {}", page.id),
                None => println!("Registry holds an unowned model"),
            }
        }
        None => println!("Registry is empty"),
    }
}

/// Loader used for replay runs: fabricates a one-node model with a single
/// looping clip instead of fetching anything.
struct StubLoader;

impl AssetLoader for StubLoader {
    fn load(
        &self,
        page: &Page,
    ) -> futures_util::future::LocalBoxFuture<'static, Result<LoadedAsset, AssetError>> {
        let nodes = vec![ModelNode::leaf("body", Vec3::ZERO, 0.5)];
        let scene = Arc::new(SceneModel::new(nodes, page.position, page.scale));
        let clips = vec![AnimationClip {
            name: "main".to_string(),
            duration: 2.0,
            looping: true,
        }];
        async move { Ok(LoadedAsset { scene, clips }) }.boxed_local()
    }
}

#[derive(Debug)]
struct SilentSink;

impl AudioSink for SilentSink {
    fn play(&self) -> Result<(), PlaybackRejected> {
        Ok(())
    }

    fn pause(&self) {}

    fn set_position(&self, _seconds: f32) {}

    fn set_loop(&self, _looped: bool) {}
}

#[derive(Debug)]
struct SilentOutput;

impl AudioOutput for SilentOutput {
    fn open(&self, _path: &str) -> Arc<dyn AudioSink> {
        Arc::new(SilentSink)
    }
}

struct CliOptions {
    pages_path: String,
    script_path: Option<String>,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let Some(pages_path) = args.next() else {
            return Err(anyhow!("Usage: storybook-runtime <pages.xml> [events.txt]"));
        };
        let script_path = args.next();
        if let Some(extra) = args.next() {
            return Err(anyhow!("Unexpected argument: {extra}"));
        }
        Ok(Self {
            pages_path,
            script_path,
        })
    }
}
