#![deny(missing_docs)]
//! Poster asset catalog and best-fit selection.
//!
//! The remote host publishes the alert poster in a fixed set of pixel sizes.
//! [`Catalog::select`] picks the size that best fits a viewport, weighting
//! aspect ratio far above absolute resolution: a wrong ratio crops or
//! letterboxes the poster, a wrong resolution only rescales it. The
//! smallest-area entry doubles as the liveness probe asset.

use thiserror::Error;
use url::Url;

/// Live poster host.
pub const LIVE_BASE_URL: &str = "https://services.burgernetcdn.nl/landactiehost/api/v1/poster/";
/// Test poster host.
pub const TEST_BASE_URL: &str = "https://services.burgernet.nl/landactiehost/api/test/poster/";
/// Where the poster links to unless links are suppressed.
pub const READ_MORE_URL: &str = "https://www.amberalert.nl/?utm_source=AmberLoader";

const RATIO_WEIGHT: f64 = 1000.0;
const AREA_WEIGHT: f64 = 0.001;

const STANDARD_SIZES: [(u32, u32); 10] = [
    (1920, 1080),
    (1280, 720),
    (1080, 1920),
    (720, 1280),
    (1080, 1080),
    (1024, 768),
    (768, 1024),
    (800, 600),
    (600, 800),
    (480, 320),
];

/// Catalog construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A catalog needs at least one size.
    #[error("catalog has no sizes")]
    Empty,

    /// A size with a zero dimension cannot be scored.
    #[error("degenerate size {0}")]
    Degenerate(ImageSize),

    /// A base URL failed to parse.
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBase {
        /// Offending URL.
        url: String,
        /// Parser message.
        reason: String,
    },
}

/// Pixel dimensions of one poster asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageSize {
    /// Creates a size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel area.
    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    fn ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Fit score against a viewport; lower is better.
    pub fn score(self, viewport: Viewport) -> f64 {
        let viewport = viewport.clamped();
        let ratio_diff = (self.ratio() - viewport.ratio()).abs();
        let area_diff = (self.area() as f64 - viewport.area() as f64).abs();
        ratio_diff * RATIO_WEIGHT + area_diff * AREA_WEIGHT
    }

    /// File name of this size on the poster host.
    pub fn file_name(self) -> String {
        format!("{}x{}.png", self.width, self.height)
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Visible browser area in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Inner width.
    pub width: u32,
    /// Inner height.
    pub height: u32,
}

impl Viewport {
    /// Creates a viewport.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Zero dimensions become one so scoring stays finite.
    fn clamped(self) -> ImageSize {
        ImageSize::new(self.width.max(1), self.height.max(1))
    }
}

/// Ordered set of poster sizes plus the hosts they live on.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    sizes: Vec<ImageSize>,
    live_base: Url,
    test_base: Url,
}

impl Catalog {
    /// Builds a catalog, validating sizes and base URLs.
    pub fn new(
        sizes: Vec<ImageSize>,
        live_base: &str,
        test_base: &str,
    ) -> Result<Self, CatalogError> {
        if sizes.is_empty() {
            return Err(CatalogError::Empty);
        }
        if let Some(bad) = sizes.iter().find(|s| s.width == 0 || s.height == 0) {
            return Err(CatalogError::Degenerate(*bad));
        }
        Ok(Self {
            sizes,
            live_base: parse_base(live_base)?,
            test_base: parse_base(test_base)?,
        })
    }

    /// The catalog published by the Dutch poster host.
    pub fn standard() -> Self {
        match Self::new(standard_sizes(), LIVE_BASE_URL, TEST_BASE_URL) {
            Ok(catalog) => catalog,
            Err(err) => unreachable!("standard catalog is valid: {err}"),
        }
    }

    /// Standard sizes served from a single base, for live and test mode alike.
    pub fn hosted_at(base: &str) -> Result<Self, CatalogError> {
        Self::new(standard_sizes(), base, base)
    }

    /// Sizes in catalog order.
    pub fn sizes(&self) -> &[ImageSize] {
        &self.sizes
    }

    /// Best-fitting size for `viewport`. Ties go to the earlier entry.
    pub fn select(&self, viewport: Viewport) -> ImageSize {
        select_best(&self.sizes, viewport).unwrap_or(self.sizes[0])
    }

    /// Smallest-area size, used as the liveness probe. Ties go to the earlier entry.
    pub fn probe_size(&self) -> ImageSize {
        let mut best = self.sizes[0];
        for &size in &self.sizes[1..] {
            if size.area() < best.area() {
                best = size;
            }
        }
        best
    }

    /// Location of `size` on the live or test host.
    pub fn asset_url(&self, size: ImageSize, test_mode: bool) -> Url {
        let base = if test_mode {
            &self.test_base
        } else {
            &self.live_base
        };
        let mut url = base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&size.file_name());
        }
        url
    }

    /// Probe asset location with a cache-busting query.
    pub fn probe_url(&self, test_mode: bool, now: u64) -> Url {
        let mut url = self.asset_url(self.probe_size(), test_mode);
        url.query_pairs_mut().append_pair("t", &now.to_string());
        url
    }

    /// Poster that best fits `viewport`.
    pub fn poster_url(&self, viewport: Viewport, test_mode: bool) -> Url {
        self.asset_url(self.select(viewport), test_mode)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_sizes() -> Vec<ImageSize> {
    STANDARD_SIZES
        .iter()
        .map(|&(w, h)| ImageSize::new(w, h))
        .collect()
}

/// Minimum-score entry of `sizes` for `viewport`, first wins on ties.
pub fn select_best(sizes: &[ImageSize], viewport: Viewport) -> Option<ImageSize> {
    let mut best: Option<(ImageSize, f64)> = None;
    for &size in sizes {
        let score = size.score(viewport);
        match best {
            Some((_, best_score)) if score >= best_score => {}
            _ => best = Some((size, score)),
        }
    }
    best.map(|(size, _)| size)
}

fn parse_base(raw: &str) -> Result<Url, CatalogError> {
    let url = Url::parse(raw).map_err(|err| CatalogError::InvalidBase {
        url: raw.to_owned(),
        reason: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(CatalogError::InvalidBase {
            url: raw.to_owned(),
            reason: "not a hierarchical url".into(),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_viewport_match_scores_zero_and_wins() {
        let catalog = Catalog::standard();
        let full_hd = Viewport::new(1920, 1080);
        assert_eq!(catalog.select(full_hd), ImageSize::new(1920, 1080));
        assert_eq!(ImageSize::new(1920, 1080).score(full_hd), 0.0);
    }

    #[test]
    fn phones_get_portrait_and_monitors_landscape() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.select(Viewport::new(390, 844)), ImageSize::new(600, 800));
        // Larger than every entry: the 16:9 asset closest in area wins.
        assert_eq!(catalog.select(Viewport::new(3840, 2160)), ImageSize::new(1920, 1080));
    }

    #[test]
    fn ties_resolve_to_catalog_order() {
        let sizes = [ImageSize::new(200, 100), ImageSize::new(200, 100)];
        let first = select_best(&sizes, Viewport::new(10, 10));
        assert_eq!(first, Some(sizes[0]));
        assert_eq!(select_best(&[], Viewport::new(10, 10)), None);
    }

    #[test]
    fn zero_viewport_is_clamped() {
        let catalog = Catalog::standard();
        let size = catalog.select(Viewport::new(0, 0));
        assert!(size.score(Viewport::new(0, 0)).is_finite());
    }

    #[test]
    fn probe_asset_is_the_smallest_entry() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.probe_size(), ImageSize::new(480, 320));
        assert_eq!(
            catalog.probe_url(false, 1_700_000_000).as_str(),
            "https://services.burgernetcdn.nl/landactiehost/api/v1/poster/480x320.png?t=1700000000"
        );
    }

    #[test]
    fn test_mode_switches_host() {
        let catalog = Catalog::standard();
        assert_eq!(
            catalog.asset_url(ImageSize::new(800, 600), true).as_str(),
            "https://services.burgernet.nl/landactiehost/api/test/poster/800x600.png"
        );
    }

    #[test]
    fn single_host_serves_both_modes() {
        let catalog = Catalog::hosted_at("http://127.0.0.1:8080/poster").unwrap();
        assert_eq!(catalog.sizes(), Catalog::standard().sizes());
        assert_eq!(
            catalog.probe_url(true, 7).as_str(),
            "http://127.0.0.1:8080/poster/480x320.png?t=7"
        );
        assert_eq!(
            catalog.asset_url(ImageSize::new(800, 600), false),
            catalog.asset_url(ImageSize::new(800, 600), true)
        );
        assert!(Catalog::hosted_at("/poster/").is_err());
    }

    #[test]
    fn invalid_catalogs_are_rejected() {
        assert_eq!(
            Catalog::new(Vec::new(), LIVE_BASE_URL, TEST_BASE_URL),
            Err(CatalogError::Empty)
        );
        assert_eq!(
            Catalog::new(vec![ImageSize::new(0, 10)], LIVE_BASE_URL, TEST_BASE_URL),
            Err(CatalogError::Degenerate(ImageSize::new(0, 10)))
        );
        assert!(matches!(
            Catalog::new(vec![ImageSize::new(1, 1)], "mailto:x@y", TEST_BASE_URL),
            Err(CatalogError::InvalidBase { .. })
        ));
    }

    mod prop {
        use super::*;
        use proptest::collection;
        use proptest::prelude::*;

        fn size() -> impl Strategy<Value = ImageSize> {
            (1u32..4000, 1u32..4000).prop_map(|(w, h)| ImageSize::new(w, h))
        }

        proptest! {
            /// The selection has the minimum score of the whole catalog.
            #[test]
            fn selection_minimises_score(
                sizes in collection::vec(size(), 1..16),
                w in 1u32..5000,
                h in 1u32..5000,
            ) {
                let viewport = Viewport::new(w, h);
                let chosen = select_best(&sizes, viewport).unwrap();
                let best = chosen.score(viewport);
                for s in &sizes {
                    prop_assert!(best <= s.score(viewport));
                }
            }

            /// Swapping a losing entry for a strictly worse one never changes the winner.
            #[test]
            fn worse_replacements_do_not_change_winner(
                sizes in collection::vec(size(), 2..16),
                w in 1u32..5000,
                h in 1u32..5000,
                pick in any::<proptest::sample::Index>(),
                candidate in size(),
            ) {
                let viewport = Viewport::new(w, h);
                let chosen = select_best(&sizes, viewport).unwrap();
                let chosen_idx = sizes.iter().position(|s| *s == chosen).unwrap();
                let idx = pick.index(sizes.len());
                prop_assume!(idx != chosen_idx);
                prop_assume!(candidate.score(viewport) > sizes[idx].score(viewport));

                let mut replaced = sizes.clone();
                replaced[idx] = candidate;
                prop_assert_eq!(select_best(&replaced, viewport), Some(chosen));
            }
        }
    }
}
