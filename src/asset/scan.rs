//! Asset discovery (read-only, no side effects).
//!
//! Roots are visited in a fixed order:
//!
//! ```text
//! build output   dist/a.png          -> dist/a.png
//! static dir     public/img/b.jpg    -> dist/img/b.jpg
//! include dir    extra/c.webp        -> extra/c.webp          (in place)
//! include remap  public/logo.png     -> compressed/logo.png   (base name)
//! ```
//!
//! A root that cannot be read is logged and contributes nothing. Each
//! destination is claimed once: a later asset that would write a claimed
//! destination, read one, or overwrite an earlier asset's source is dropped.

use jwalk::WalkDir;
use rustc_hash::FxHashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::AssetPath;
use super::path::file_name;
use crate::config::IncludeEntry;
use crate::encoder::{MatchRule, Registry};
use crate::utils::path::normalize_path;

/// Raster formats always considered, on top of the registry rules.
const ALLOW_LIST: &str = r"\.(png|jpeg|jpg|bmp|webp)$";

/// Decides which file names qualify for processing.
pub struct AssetFilter<'a> {
    allow: MatchRule,
    registry: &'a Registry,
    exclude: Option<&'a MatchRule>,
}

impl<'a> AssetFilter<'a> {
    pub fn new(registry: &'a Registry, exclude: Option<&'a MatchRule>) -> Self {
        Self {
            allow: MatchRule::new(ALLOW_LIST).expect("allow-list pattern is valid"),
            registry,
            exclude,
        }
    }

    /// Allow-listed or matched by any encoder, and not excluded.
    ///
    /// Exclusion always wins.
    pub fn accepts(&self, path: &Path) -> bool {
        let name = file_name(path);
        if name.is_empty() || self.exclude.is_some_and(|rule| rule.is_match(name)) {
            return false;
        }
        self.allow.is_match(name) || self.registry.matches_any(name)
    }
}

/// Where to look for assets.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryRoots<'a> {
    pub output_dir: &'a Path,
    /// Names emitted by the build, relative to `output_dir`.
    pub emitted: &'a [String],
    /// Walk `output_dir` instead of trusting `emitted`.
    pub scan_output: bool,
    pub static_dir: Option<&'a Path>,
    pub include_dirs: &'a [IncludeEntry],
}

/// Collect every qualifying asset, in root order.
pub fn discover(roots: &DiscoveryRoots<'_>, filter: &AssetFilter<'_>) -> Vec<AssetPath> {
    let mut assets = if roots.scan_output {
        scan_tree(roots.output_dir, filter, |path| AssetPath::in_place(path))
    } else {
        scan_emitted(roots.output_dir, roots.emitted, filter)
    };

    if let Some(static_dir) = roots.static_dir {
        assets.extend(scan_tree(static_dir, filter, |path| {
            let rel = path.strip_prefix(static_dir).unwrap_or(&path);
            let to = roots.output_dir.join(rel);
            AssetPath::new(path, to)
        }));
    }

    for entry in roots.include_dirs {
        assets.extend(scan_include(entry, filter));
    }

    let assets = claim_destinations(assets);
    crate::debug!("discover"; "{} candidate assets", assets.len());
    assets
}

/// Keep the first asset per destination, in root order.
///
/// Encode jobs run concurrently, so no two kept assets may write the same
/// file, and no kept asset may write a file another one reads.
fn claim_destinations(assets: Vec<AssetPath>) -> Vec<AssetPath> {
    let mut written: FxHashSet<PathBuf> = FxHashSet::default();
    let mut read: FxHashSet<PathBuf> = FxHashSet::default();

    assets
        .into_iter()
        .filter(|asset| {
            let clash = written.contains(&asset.to)
                || written.contains(&asset.from)
                || read.contains(&asset.to);
            if clash {
                if read.contains(&asset.from) && written.contains(&asset.to) {
                    crate::debug!("discover"; "duplicate {}", asset.from.display());
                } else {
                    crate::log!(
                        "discover";
                        "skipping {}: {} already claimed",
                        asset.from.display(),
                        asset.to.display()
                    );
                }
                return false;
            }
            read.insert(asset.from.clone());
            written.insert(asset.to.clone());
            true
        })
        .collect()
}

/// Emitted build outputs, replaced in place.
fn scan_emitted(output_dir: &Path, names: &[String], filter: &AssetFilter<'_>) -> Vec<AssetPath> {
    names
        .iter()
        .map(|name| normalize_path(&output_dir.join(name)))
        .filter(|path| filter.accepts(path))
        .filter(|path| {
            let exists = path.is_file();
            if !exists {
                crate::debug!("discover"; "emitted file missing: {}", path.display());
            }
            exists
        })
        .map(AssetPath::in_place)
        .collect()
}

fn scan_include(entry: &IncludeEntry, filter: &AssetFilter<'_>) -> Vec<AssetPath> {
    match entry.destination() {
        None => scan_tree(entry.source(), filter, AssetPath::in_place),
        Some(to_root) => scan_tree(entry.source(), filter, |path| {
            let to = to_root.join(file_name(&path));
            AssetPath::new(path, to)
        }),
    }
}

/// Walk `root` and map each accepted file to its asset paths.
fn scan_tree(
    root: &Path,
    filter: &AssetFilter<'_>,
    map: impl Fn(PathBuf) -> AssetPath,
) -> Vec<AssetPath> {
    match walk_files(root) {
        Ok(files) => files
            .into_iter()
            .filter(|path| filter.accepts(path))
            .map(map)
            .collect(),
        Err(e) => {
            crate::log!("discover"; "skipping {}: {}", root.display(), e);
            Vec::new()
        }
    }
}

/// All regular files under `root`, sorted by path.
fn walk_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    if !fs::metadata(root)?.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a directory",
        ));
    }

    let mut files: Vec<_> = WalkDir::new(root)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"img").unwrap();
    }

    fn roots<'a>(
        output_dir: &'a Path,
        emitted: &'a [String],
        static_dir: Option<&'a Path>,
        include_dirs: &'a [IncludeEntry],
    ) -> DiscoveryRoots<'a> {
        DiscoveryRoots {
            output_dir,
            emitted,
            scan_output: false,
            static_dir,
            include_dirs,
        }
    }

    #[test]
    fn test_filter_allow_list_and_registry() {
        let registry = Registry::defaults();
        let filter = AssetFilter::new(&registry, None);

        assert!(filter.accepts(Path::new("/a/photo.BMP")));
        assert!(filter.accepts(Path::new("/a/photo.avif")));
        assert!(filter.accepts(Path::new("/a/photo.jxl")));
        assert!(!filter.accepts(Path::new("/a/app.js")));
        assert!(!filter.accepts(Path::new("/a/photo.gif")));
    }

    #[test]
    fn test_exclusion_wins() {
        let registry = Registry::defaults();
        let exclude = MatchRule::new(r"\.webp$").unwrap();
        let filter = AssetFilter::new(&registry, Some(&exclude));

        // allow-listed and registry-matched, still excluded
        assert!(!filter.accepts(Path::new("/a/hero.webp")));
        assert!(filter.accepts(Path::new("/a/hero.png")));
    }

    #[test]
    fn test_include_remap_uses_base_name() {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        let compressed = dir.path().join("compressed");
        touch(&public.join("logo.png"));
        touch(&public.join("nested/icon.png"));
        touch(&public.join("readme.txt"));

        let includes = vec![IncludeEntry::Remap {
            from: public.clone(),
            to: compressed.clone(),
        }];
        let registry = Registry::defaults();
        let filter = AssetFilter::new(&registry, None);
        let out = dir.path().join("dist");
        let assets = discover(&roots(&out, &[], None, &includes), &filter);

        assert_eq!(
            assets,
            vec![
                AssetPath::new(public.join("logo.png"), compressed.join("logo.png")),
                AssetPath::new(public.join("nested/icon.png"), compressed.join("icon.png")),
            ]
        );
    }

    #[test]
    fn test_root_order_and_static_mapping() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        let public = dir.path().join("public");
        let extra = dir.path().join("extra");
        touch(&out.join("assets/app.png"));
        touch(&public.join("img/b.jpg"));
        touch(&public.join("img/a.jpg"));
        touch(&extra.join("c.webp"));

        let emitted = vec!["assets/app.png".to_string(), "assets/app.js".to_string()];
        let includes = vec![IncludeEntry::Simple(extra.clone())];
        let registry = Registry::defaults();
        let filter = AssetFilter::new(&registry, None);
        let assets = discover(&roots(&out, &emitted, Some(&public), &includes), &filter);

        assert_eq!(
            assets,
            vec![
                AssetPath::in_place(out.join("assets/app.png")),
                AssetPath::new(public.join("img/a.jpg"), out.join("img/a.jpg")),
                AssetPath::new(public.join("img/b.jpg"), out.join("img/b.jpg")),
                AssetPath::in_place(extra.join("c.webp")),
            ]
        );
    }

    #[test]
    fn test_failing_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let extra = dir.path().join("extra");
        touch(&extra.join("c.png"));
        let includes = vec![
            IncludeEntry::Simple(dir.path().join("missing")),
            IncludeEntry::Simple(extra.clone()),
        ];
        let registry = Registry::defaults();
        let filter = AssetFilter::new(&registry, None);
        let out = dir.path().join("dist");
        let missing_static = dir.path().join("public");
        let assets = discover(
            &roots(&out, &[], Some(&missing_static), &includes),
            &filter,
        );

        assert_eq!(assets, vec![AssetPath::in_place(extra.join("c.png"))]);
    }

    #[test]
    fn test_scan_output_walks_tree() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        touch(&out.join("a.png"));
        touch(&out.join("deep/b.jpg"));

        let registry = Registry::defaults();
        let filter = AssetFilter::new(&registry, None);
        let mut roots = roots(&out, &[], None, &[]);
        roots.scan_output = true;

        let assets = discover(&roots, &filter);
        assert_eq!(assets.len(), 2);
        assert!(assets.iter().all(AssetPath::is_in_place));
    }

    #[test]
    fn test_repeated_emitted_name_kept_once() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        touch(&out.join("a.png"));

        let emitted = vec!["a.png".to_string(), "./a.png".to_string()];
        let registry = Registry::defaults();
        let filter = AssetFilter::new(&registry, None);
        let assets = discover(&roots(&out, &emitted, None, &[]), &filter);

        assert_eq!(assets, vec![AssetPath::in_place(out.join("a.png"))]);
    }

    #[test]
    fn test_scanned_output_claims_static_destination() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        let public = dir.path().join("public");
        touch(&out.join("b.png"));
        touch(&public.join("b.png"));
        touch(&public.join("c.png"));

        let registry = Registry::defaults();
        let filter = AssetFilter::new(&registry, None);
        let mut roots = roots(&out, &[], Some(&public), &[]);
        roots.scan_output = true;
        let assets = discover(&roots, &filter);

        assert_eq!(
            assets,
            vec![
                AssetPath::in_place(out.join("b.png")),
                AssetPath::new(public.join("c.png"), out.join("c.png")),
            ]
        );
    }

    #[test]
    fn test_flattened_remap_first_wins() {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        let compressed = dir.path().join("compressed");
        touch(&public.join("sub1/logo.png"));
        touch(&public.join("sub2/logo.png"));

        let includes = vec![IncludeEntry::Remap {
            from: public.clone(),
            to: compressed.clone(),
        }];
        let registry = Registry::defaults();
        let filter = AssetFilter::new(&registry, None);
        let out = dir.path().join("dist");
        let assets = discover(&roots(&out, &[], None, &includes), &filter);

        assert_eq!(
            assets,
            vec![AssetPath::new(
                public.join("sub1/logo.png"),
                compressed.join("logo.png")
            )]
        );
    }

    #[test]
    fn test_destination_of_one_never_source_of_another() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        let public = dir.path().join("public");
        let mirror = dir.path().join("mirror");
        touch(&public.join("d.png"));
        touch(&out.join("d.png"));

        // static writes dist/d.png, so the include must not read it
        let includes = vec![IncludeEntry::Remap {
            from: out.clone(),
            to: mirror.clone(),
        }];
        let registry = Registry::defaults();
        let filter = AssetFilter::new(&registry, None);
        let assets = discover(&roots(&out, &[], Some(&public), &includes), &filter);

        assert_eq!(
            assets,
            vec![AssetPath::new(public.join("d.png"), out.join("d.png"))]
        );
    }
}
