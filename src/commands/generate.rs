//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::generator::Generator;
use crate::Blog;

/// Debounce window for file system events
const DEBOUNCE: Duration = Duration::from_millis(500);

/// Generate the static site
pub fn run(blog: &Blog) -> Result<()> {
    let start = Instant::now();

    let generator = Generator::new(blog)?;
    generator.generate()?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Watch posts, static files and the config, regenerating on change.
///
/// Blocks until the watcher channel closes. A changed `_config.yml` is
/// reloaded before the next build.
pub fn watch(blog: &Blog) -> Result<()> {
    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(DEBOUNCE, tx)?;

    for dir in [&blog.posts_dir, &blog.static_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    let config_path = blog.base_dir.join("_config.yml");
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut blog = blog.clone();
    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant(&blog, &e.path))
                    .collect();
                if changed.is_empty() {
                    continue;
                }

                for event in &changed {
                    tracing::info!("File changed: {}", event.path.display());
                }

                if changed.iter().any(|e| e.path.ends_with("_config.yml")) {
                    match Blog::new(&blog.base_dir) {
                        Ok(reloaded) => blog = reloaded,
                        Err(e) => tracing::error!("Failed to reload config: {:#}", e),
                    }
                }

                tracing::info!("Regenerating...");
                if let Err(e) = run(&blog) {
                    tracing::error!("Generation failed: {:#}", e);
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Editor droppings and our own output do not trigger a rebuild
fn is_relevant(blog: &Blog, path: &Path) -> bool {
    if path.starts_with(&blog.public_dir) {
        return false;
    }
    let in_git = path.components().any(|c| c.as_os_str() == ".git");
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    !in_git && name != ".DS_Store" && !name.ends_with('~') && !name.ends_with(".swp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_is_relevant() {
        let blog = Blog::with_config("/site", SiteConfig::default());
        assert!(is_relevant(&blog, Path::new("/site/posts/hello.md")));
        assert!(is_relevant(&blog, Path::new("/site/_config.yml")));
        assert!(!is_relevant(&blog, Path::new("/site/public/index.html")));
        assert!(!is_relevant(&blog, Path::new("/site/posts/hello.md~")));
        assert!(!is_relevant(&blog, Path::new("/site/posts/.hello.md.swp")));
        assert!(!is_relevant(&blog, Path::new("/site/static/.DS_Store")));
        assert!(!is_relevant(&blog, Path::new("/site/posts/.git/index")));
        assert!(is_relevant(&blog, Path::new("/site/posts/using.github-actions.md")));
        assert!(is_relevant(&blog, Path::new("/site/static/.gitkeep")));
    }

    #[test]
    fn test_run_writes_site() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("posts")).unwrap();
        std::fs::write(
            dir.path().join("posts/hello.md"),
            "---\ntitle: Hello\ndate: 2024-03-01\n---\nHi\n",
        )
        .unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        run(&blog).unwrap();
        assert!(blog.public_dir.join("posts/hello/index.html").exists());
    }
}
