use std::path::{Path, PathBuf};

use color_eyre::Result;

use crate::{
    backend::ImageBackend,
    llm::Llm,
    render::{join_tags, render},
    synth::{Profile, synthesize},
};

/// The whole run: idea → structured prompt → rendered batch on disk.
/// Returns the written file paths in batch order. A failed synthesis aborts
/// before the image backend is ever contacted.
pub async fn run(
    llm: &dyn Llm,
    backend: &dyn ImageBackend,
    profile: &Profile,
    idea: &str,
    batch_size: u32,
    output_root: &Path,
) -> Result<Vec<PathBuf>> {
    let prompt = synthesize(llm, profile, idea).await?;

    println!(
        "Positive prompt: {}",
        join_tags(&prompt.positive, profile.join_delimiter)
    );
    println!(
        "Negative prompt: {}",
        join_tags(&prompt.negative, profile.join_delimiter)
    );

    render(
        backend,
        &prompt,
        profile.join_delimiter,
        batch_size,
        output_root,
    )
    .await
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::Mutex};

    use tempfile::tempdir;

    use crate::{
        backend::{ImageBatchFuture, Txt2ImgRequest},
        llm::{CompletionFuture, Request},
    };

    use super::*;

    struct CannedLlm(String);

    impl Llm for CannedLlm {
        fn complete<'a>(&'a self, _req: Request) -> CompletionFuture<'a> {
            let text = self.0.clone();
            Box::pin(async move { Ok(text) })
        }
    }

    #[derive(Default)]
    struct RecordingBackend {
        requests: Mutex<Vec<Txt2ImgRequest>>,
    }

    impl ImageBackend for RecordingBackend {
        fn txt2img<'a>(&'a self, req: Txt2ImgRequest) -> ImageBatchFuture<'a> {
            Box::pin(async move {
                let batch_size = req.batch_size as usize;
                self.requests.lock().unwrap().push(req);
                Ok(vec![b"png bytes".to_vec(); batch_size])
            })
        }
    }

    #[tokio::test]
    async fn cat_wizard_runs_end_to_end() {
        let llm = CannedLlm(r#"{"positive": ["a cat", "wizard robe"], "negative": ["blurry"]}"#.into());
        let backend = RecordingBackend::default();
        let root = tempdir().unwrap();

        let paths = run(&llm, &backend, &Profile::v1(), "a cat wizard", 1, root.path())
            .await
            .unwrap();

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].file_name().unwrap(), "0.png");
        assert!(paths[0].exists());

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "a cat, wizard robe");
        assert_eq!(requests[0].negative_prompt, "blurry");
        assert_eq!(requests[0].batch_size, 1);
    }

    #[tokio::test]
    async fn empty_llm_response_never_contacts_the_backend() {
        let llm = CannedLlm(String::new());
        let backend = RecordingBackend::default();
        let root = tempdir().unwrap();

        let err = run(&llm, &backend, &Profile::v1(), "a cat wizard", 1, root.path())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no prompt generated"));
        assert!(backend.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unparseable_llm_response_writes_no_files() {
        let llm = CannedLlm("not json".into());
        let backend = RecordingBackend::default();
        let root = tempdir().unwrap();

        let result = run(&llm, &backend, &Profile::v1(), "a cat wizard", 1, root.path()).await;

        assert!(result.is_err());
        assert!(backend.requests.lock().unwrap().is_empty());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }
}
