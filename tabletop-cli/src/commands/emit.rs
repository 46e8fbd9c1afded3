use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tabletop_pipeline::{
    CollectionEmitter, EnrichmentCache, JsonEmitter, assemble_collection, load_store,
};

use crate::cli_types::{CacheArgs, OutputArgs, StoreArgs};
use crate::error::CliError;
use crate::settings::Settings;

use super::pick;

/// Assemble the collection and write it as JSON.
pub(crate) fn run_emit(
    settings: &Settings,
    store: StoreArgs,
    cache: CacheArgs,
    output: OutputArgs,
) -> Result<(), CliError> {
    let store_path = pick(store.store, &settings.paths.store);
    let cache_path = pick(cache.cache, &settings.paths.cache);
    let images_dir = pick(cache.images, &settings.paths.images);
    let output_path = pick(output.output, &settings.paths.collection);
    emit_collection(&store_path, &cache_path, &images_dir, &output_path)
}

pub(crate) fn emit_collection(
    store_path: &Path,
    cache_path: &Path,
    images_dir: &Path,
    output_path: &Path,
) -> Result<(), CliError> {
    let records = load_store(store_path)?;
    let cache = EnrichmentCache::open(cache_path, images_dir)?;
    let games = assemble_collection(&records, &cache);

    let resolved = records.iter().filter(|r| r.is_resolved()).count();
    if games.len() < resolved {
        log::warn!(
            "{} resolved rows are not enriched yet; run 'tabletop enrich'",
            resolved - games.len()
        );
    }

    let emitter = JsonEmitter::new(output_path, images_prefix(images_dir, output_path));
    emitter.emit(&games)?;
    log::info!(
        "{} {} games written to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        games.len(),
        output_path.display().if_supports_color(Stdout, |t| t.cyan())
    );
    Ok(())
}

/// The images directory as seen from the output file's directory.
fn images_prefix(images_dir: &Path, output_path: &Path) -> String {
    let base = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let relative = absolute(images_dir)
        .zip(absolute(base))
        .and_then(|(images, base)| pathdiff::diff_paths(images, base))
        .unwrap_or_else(|| images_dir.to_path_buf());
    relative.to_string_lossy().replace('\\', "/")
}

fn absolute(path: &Path) -> Option<PathBuf> {
    std::path::absolute(path).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_relative_to_output() {
        assert_eq!(
            images_prefix(Path::new("images"), Path::new("collection.json")),
            "images"
        );
        assert_eq!(
            images_prefix(Path::new("images"), Path::new("site/collection.json")),
            "../images"
        );
        assert_eq!(
            images_prefix(Path::new("site/images"), Path::new("site/collection.json")),
            "images"
        );
    }
}
