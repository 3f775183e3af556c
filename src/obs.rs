//! Observation bundle and spectrum calibration seam
//!
//! An observation carries an optional spectrum (flux, uncertainty, pixel
//! mask) and optional photometry (maggies, uncertainty, band mask). The
//! numerical normalization and log-transform routines applied at
//! ingestion are external to the core and enter through the
//! [`Calibration`] trait; [`MedianCalibration`] is the stock
//! implementation.

use ndarray::Array1;

/// An observed spectrum and/or photometry bundle.
///
/// Presence of `spectrum` / `maggies` gates whether spectroscopic /
/// photometric degrees of freedom are counted and whether rescaling is
/// applied during ingestion.
#[derive(Debug, Clone, Default)]
pub struct Observation {
    /// Observed-frame wavelengths, Angstroms.
    pub wavelength: Option<Array1<f64>>,

    /// Observed flux per wavelength pixel.
    pub spectrum: Option<Array1<f64>>,

    /// One-sigma uncertainty per pixel.
    pub unc: Option<Array1<f64>>,

    /// Per-pixel good-data mask; a missing mask counts every pixel.
    pub mask: Option<Array1<bool>>,

    /// Photometric fluxes in maggies, one per band.
    pub maggies: Option<Array1<f64>>,

    /// One-sigma photometric uncertainty per band.
    pub maggies_unc: Option<Array1<f64>>,

    /// Per-band good-data mask; a missing mask counts every band.
    pub phot_mask: Option<Array1<bool>>,
}

impl Observation {
    pub fn has_spectrum(&self) -> bool {
        self.spectrum.is_some()
    }

    pub fn has_photometry(&self) -> bool {
        self.maggies.is_some()
    }

    /// Number of unmasked spectral pixels.
    pub fn spec_pixel_count(&self) -> usize {
        match (&self.spectrum, &self.mask) {
            (Some(_), Some(mask)) => mask.iter().filter(|&&m| m).count(),
            (Some(spec), None) => spec.len(),
            (None, _) => 0,
        }
    }

    /// Number of unmasked photometric bands.
    pub fn phot_band_count(&self) -> usize {
        match (&self.maggies, &self.phot_mask) {
            (Some(_), Some(mask)) => mask.iter().filter(|&&m| m).count(),
            (Some(maggies), None) => maggies.len(),
            (None, _) => 0,
        }
    }
}

/// The external spectrum-calibration routines consumed at ingestion.
///
/// Both operations are pure: they read the observation and return new
/// values without touching model state.
pub trait Calibration {
    /// Derive a normalization for the observed spectrum.
    ///
    /// Returns `(scale, pivot)`: the multiplicative scale dividing the
    /// `spec_norm` parameter, and the pivot wavelength the normalization
    /// refers to.
    fn normalize(&self, obs: &Observation) -> (f64, f64);

    /// Transform a spectrum to log flux.
    ///
    /// Returns `(flux', unc', mask')`: natural-log flux, the propagated
    /// uncertainty, and a mask restricted to pixels where the transform
    /// is defined.
    fn logify(
        &self,
        flux: &Array1<f64>,
        unc: &Array1<f64>,
        mask: &Array1<bool>,
    ) -> (Array1<f64>, Array1<f64>, Array1<bool>);
}

/// Stock calibration: normalize to the mean unmasked flux at the median
/// unmasked wavelength, logify with fractional uncertainties.
#[derive(Debug, Clone, Default)]
pub struct MedianCalibration;

impl Calibration for MedianCalibration {
    fn normalize(&self, obs: &Observation) -> (f64, f64) {
        let spec = match &obs.spectrum {
            Some(s) => s,
            None => return (1.0, f64::NAN),
        };
        let masked = |i: usize| obs.mask.as_ref().map(|m| m[i]).unwrap_or(true);

        let mut total = 0.0;
        let mut count = 0usize;
        for (i, &f) in spec.iter().enumerate() {
            if masked(i) {
                total += f;
                count += 1;
            }
        }
        let scale = if count > 0 { total / count as f64 } else { 1.0 };

        let pivot = match &obs.wavelength {
            Some(wave) => {
                let mut kept: Vec<f64> = wave
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| masked(*i))
                    .map(|(_, &w)| w)
                    .collect();
                kept.sort_by(|a, b| a.total_cmp(b));
                if kept.is_empty() {
                    f64::NAN
                } else {
                    kept[kept.len() / 2]
                }
            }
            None => f64::NAN,
        };

        (scale, pivot)
    }

    fn logify(
        &self,
        flux: &Array1<f64>,
        unc: &Array1<f64>,
        mask: &Array1<bool>,
    ) -> (Array1<f64>, Array1<f64>, Array1<bool>) {
        let log_flux = flux.mapv(|f| if f > 0.0 { f.ln() } else { f64::NAN });
        let log_unc = Array1::from_iter(
            flux.iter()
                .zip(unc.iter())
                .map(|(&f, &u)| if f > 0.0 { u / f } else { f64::NAN }),
        );
        let log_mask = Array1::from_iter(
            flux.iter().zip(mask.iter()).map(|(&f, &m)| m && f > 0.0),
        );
        (log_flux, log_unc, log_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_pixel_counts() {
        let obs = Observation {
            spectrum: Some(array![1.0, 2.0, 3.0]),
            mask: Some(array![true, false, true]),
            maggies: Some(array![0.1, 0.2]),
            ..Default::default()
        };
        assert_eq!(obs.spec_pixel_count(), 2);
        // missing phot_mask counts every band
        assert_eq!(obs.phot_band_count(), 2);

        assert_eq!(Observation::default().spec_pixel_count(), 0);
    }

    #[test]
    fn test_normalize() {
        let obs = Observation {
            wavelength: Some(array![4000.0, 5000.0, 6000.0, 7000.0]),
            spectrum: Some(array![1.0, 3.0, 5.0, 100.0]),
            mask: Some(array![true, true, true, false]),
            ..Default::default()
        };
        let (scale, pivot) = MedianCalibration.normalize(&obs);
        assert_relative_eq!(scale, 3.0);
        assert_relative_eq!(pivot, 5000.0);
    }

    #[test]
    fn test_logify() {
        let flux = array![1.0, std::f64::consts::E, -2.0];
        let unc = array![0.1, std::f64::consts::E, 0.5];
        let mask = array![true, true, true];

        let (f, u, m) = MedianCalibration.logify(&flux, &unc, &mask);
        assert_relative_eq!(f[0], 0.0);
        assert_relative_eq!(f[1], 1.0);
        assert_relative_eq!(u[1], 1.0);
        // non-positive flux is masked out by the transform
        assert!(!m[2]);
        assert!(m[0] && m[1]);
    }
}
