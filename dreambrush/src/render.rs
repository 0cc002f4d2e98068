use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use color_eyre::{
    Result,
    eyre::{Context, ensure},
};

use crate::{
    backend::{ImageBackend, Txt2ImgRequest},
    synth::StructuredPrompt,
};

pub fn join_tags(tags: &[String], delimiter: &str) -> String {
    tags.join(delimiter)
}

/// Renders a batch of images for `prompt` and writes them to a fresh
/// timestamped directory under `output_root`. Returns the written paths in
/// batch order.
///
/// Run directories are namespaced by unix seconds; two runs within the same
/// second share a directory and silently overwrite each other. Accepted
/// limitation.
pub async fn render(
    backend: &dyn ImageBackend,
    prompt: &StructuredPrompt,
    delimiter: &str,
    batch_size: u32,
    output_root: &Path,
) -> Result<Vec<PathBuf>> {
    let positive = join_tags(&prompt.positive, delimiter);
    let negative = join_tags(&prompt.negative, delimiter);

    let images = backend
        .txt2img(Txt2ImgRequest::new(positive, negative, batch_size))
        .await?;
    ensure!(
        images.len() == batch_size as usize,
        "backend returned {} images, expected {batch_size}",
        images.len()
    );

    save_images(&images, &run_dir(output_root, unix_timestamp()?))
}

fn unix_timestamp() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is set before the unix epoch")?
        .as_secs())
}

fn run_dir(output_root: &Path, timestamp: u64) -> PathBuf {
    output_root.join(format!("gen-{timestamp}"))
}

fn save_images(images: &[Vec<u8>], run_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(run_dir).with_context(|| format!("creating {}", run_dir.display()))?;

    let mut paths = Vec::with_capacity(images.len());
    for (i, image) in images.iter().enumerate() {
        let path = run_dir.join(format!("{i}.png"));
        println!("Saving {}", path.display());
        fs::write(&path, image).with_context(|| format!("writing {}", path.display()))?;
        paths.push(path);
    }
    Ok(paths)
}
