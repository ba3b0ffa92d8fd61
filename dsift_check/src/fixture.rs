use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use nalgebra::DMatrix;
use tracing::debug;

use crate::error::{Error, Result};

/// Conventional fixture subdirectory, relative to a caller-supplied root.
pub const SIFT_DATA_DIR: &str = "data/sift";

/// Name of the conventional input image fixture.
pub const REFERENCE_IMAGE: &str = "vlimg_ref.pgm";

/// Name of the conventional reference descriptor matrix fixture.
pub const REFERENCE_MATRIX: &str = "vldsift_gref.dat";

/// Resolves fixture filenames against an explicit base directory and loads
/// them into matrices.
///
/// The base path is injected rather than taken from the process working
/// directory, so tests can point at their own directories without mutating
/// process-wide state.
pub struct FixtureDir {
    base: PathBuf,
}

impl FixtureDir {
    /// Creates a fixture directory rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        FixtureDir { base: base.into() }
    }

    /// Creates a fixture directory at the conventional `data/sift` location
    /// under `root`.
    pub fn conventional(root: impl AsRef<Path>) -> Self {
        FixtureDir {
            base: root.as_ref().join(SIFT_DATA_DIR),
        }
    }

    /// Returns the full path a fixture name resolves to.
    pub fn path(&self, name: &str) -> PathBuf {
        self.base.join(name)
    }

    /// Loads an image fixture as a row-major matrix of `f32` intensities.
    ///
    /// The file is decoded as RGB and the red plane is selected; the
    /// conventional fixture is a grayscaled image, so all three planes carry
    /// the same values. Loading the same file twice yields identical
    /// matrices.
    pub fn load_image(&self, name: &str) -> Result<DMatrix<f32>> {
        let path = self.path(name);
        let img = image::open(&path).map_err(|source| match source {
            image::ImageError::IoError(source) => Error::Io {
                path: path.clone(),
                source,
            },
            source => Error::Image {
                path: path.clone(),
                source,
            },
        })?;
        let rgb = img.to_rgb8();
        let (cols, rows) = (rgb.width() as usize, rgb.height() as usize);

        debug!(path = %path.display(), rows, cols, "loaded image fixture");
        Ok(DMatrix::from_fn(rows, cols, |r, c| {
            rgb.get_pixel(c as u32, r as u32).0[0] as f32
        }))
    }

    /// Loads a stored numeric matrix: one row per line, values separated by
    /// whitespace.
    ///
    /// Fails if any value does not parse as a float or if the rows are not
    /// all the same width.
    pub fn load_matrix(&self, name: &str) -> Result<DMatrix<f32>> {
        let path = self.path(name);
        let text = std::fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;

        let mut values: Vec<f32> = Vec::new();
        let mut width: Option<usize> = None;
        let mut rows = 0;
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let start = values.len();
            for token in line.split_whitespace() {
                let value = token.parse::<f32>().map_err(|_| Error::MalformedMatrix {
                    path: path.clone(),
                    line: idx + 1,
                    reason: format!("not a number: {token:?}"),
                })?;
                values.push(value);
            }
            let row_width = values.len() - start;
            match width {
                None => width = Some(row_width),
                Some(expected) if expected != row_width => {
                    return Err(Error::MalformedMatrix {
                        path,
                        line: idx + 1,
                        reason: format!("row has {row_width} values, expected {expected}"),
                    });
                }
                Some(_) => {}
            }
            rows += 1;
        }

        // A file with no rows at all is malformed, not an empty matrix;
        // failing here gives a clearer error than a later row-count check.
        let Some(width) = width else {
            return Err(Error::MalformedMatrix {
                path,
                line: 1,
                reason: "file contains no matrix rows".to_string(),
            });
        };
        debug!(path = %path.display(), rows, width, "loaded matrix fixture");
        Ok(DMatrix::from_row_slice(rows, width, &values))
    }

    /// Persists a matrix in the format `load_matrix` reads.
    ///
    /// Values are written with Rust's shortest round-trip float formatting,
    /// so a save/load cycle reproduces the matrix bit for bit.
    pub fn save_matrix(&self, name: &str, matrix: &DMatrix<f32>) -> Result<()> {
        let path = self.path(name);
        let io_err = |source| Error::Io {
            path: path.clone(),
            source,
        };

        let file = File::create(&path).map_err(io_err)?;
        let mut out = BufWriter::new(file);
        for r in 0..matrix.nrows() {
            for c in 0..matrix.ncols() {
                if c > 0 {
                    out.write_all(b" ").map_err(io_err)?;
                }
                write!(out, "{}", matrix[(r, c)]).map_err(io_err)?;
            }
            out.write_all(b"\n").map_err(io_err)?;
        }
        out.flush().map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_fixture() -> DMatrix<f32> {
        DMatrix::from_row_slice(
            3,
            4,
            &[
                0.0, 1.5, -2.25, 3.125e-7, //
                4.0, 5.0, 6.0, 7.0, //
                -0.5, 0.25, 1e-6, 2e-6,
            ],
        )
    }

    #[test]
    fn matrix_save_load_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let fixtures = FixtureDir::new(dir.path());
        let saved = matrix_fixture();

        fixtures.save_matrix("m.dat", &saved).unwrap();
        let loaded = fixtures.load_matrix("m.dat").unwrap();

        assert_eq!(saved, loaded);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let fixtures = FixtureDir::new(dir.path());

        match fixtures.load_matrix("absent.dat") {
            Err(Error::Io { path, .. }) => assert!(path.ends_with("absent.dat")),
            other => panic!("expected Io error, got {other:?}"),
        }
        match fixtures.load_image("absent.pgm") {
            Err(Error::Io { .. }) => {}
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_token_is_reported_with_line() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.dat"), "1 2 3\n4 oops 6\n").unwrap();
        let fixtures = FixtureDir::new(dir.path());

        match fixtures.load_matrix("bad.dat") {
            Err(Error::MalformedMatrix { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected MalformedMatrix, got {other:?}"),
        }
    }

    #[test]
    fn empty_matrix_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("empty.dat"), "").unwrap();
        std::fs::write(dir.path().join("blank.dat"), "\n   \n\t\n").unwrap();
        let fixtures = FixtureDir::new(dir.path());

        match fixtures.load_matrix("empty.dat") {
            Err(Error::MalformedMatrix { path, .. }) => assert!(path.ends_with("empty.dat")),
            other => panic!("expected MalformedMatrix, got {other:?}"),
        }
        match fixtures.load_matrix("blank.dat") {
            Err(Error::MalformedMatrix { .. }) => {}
            other => panic!("expected MalformedMatrix, got {other:?}"),
        }
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ragged.dat"), "1 2 3\n4 5\n").unwrap();
        let fixtures = FixtureDir::new(dir.path());

        match fixtures.load_matrix("ragged.dat") {
            Err(Error::MalformedMatrix { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected MalformedMatrix, got {other:?}"),
        }
    }

    #[test]
    fn image_loading_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let pixels: Vec<u8> = (0..64u32).map(|v| (v * 4) as u8).collect();
        image::save_buffer(
            dir.path().join("img.pgm"),
            &pixels,
            8,
            8,
            image::ColorType::L8,
        )
        .unwrap();

        let fixtures = FixtureDir::new(dir.path());
        let first = fixtures.load_image("img.pgm").unwrap();
        let second = fixtures.load_image("img.pgm").unwrap();

        assert_eq!(first.nrows(), 8);
        assert_eq!(first.ncols(), 8);
        assert_eq!(first, second);
        assert_eq!(first[(0, 3)], 12.0);
        assert_eq!(first[(7, 7)], 252.0);
    }

    #[test]
    fn rgb_image_uses_the_red_plane() {
        let dir = tempfile::tempdir().unwrap();
        // One pixel per channel value so the selected plane is unambiguous.
        let pixels: Vec<u8> = vec![10, 20, 30, 40, 50, 60];
        image::save_buffer(
            dir.path().join("img.png"),
            &pixels,
            2,
            1,
            image::ColorType::Rgb8,
        )
        .unwrap();

        let fixtures = FixtureDir::new(dir.path());
        let img = fixtures.load_image("img.png").unwrap();

        assert_eq!(img[(0, 0)], 10.0);
        assert_eq!(img[(0, 1)], 40.0);
    }
}
