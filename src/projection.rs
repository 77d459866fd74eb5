//! Lambert conformal conic projection on the GRS80 ellipsoid, one standard
//! parallel, no false easting or northing.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::domain::{BoundingBox, DomainGeometry};
use crate::error::VerifError;

const GRS80_A: f64 = 6_378_137.0;
const GRS80_INV_F: f64 = 298.257_222_101;

#[derive(Debug, Clone, Copy)]
pub struct LambertConformal {
    a: f64,
    e: f64,
    n: f64,
    f: f64,
    rho0: f64,
    lon0: f64,
}

impl LambertConformal {
    /// Tangent cone touching the ellipsoid at `lat0`, centred on `lon0`.
    pub fn tangent(lat0_deg: f64, lon0_deg: f64) -> Result<Self, VerifError> {
        if !lat0_deg.is_finite() || !lon0_deg.is_finite() || lat0_deg.abs() >= 90.0 {
            return Err(VerifError::Projection(format!(
                "reference point ({lat0_deg}, {lon0_deg}) is out of range"
            )));
        }
        let flattening = 1.0 / GRS80_INV_F;
        let e = (flattening * (2.0 - flattening)).sqrt();
        let phi1 = lat0_deg.to_radians();
        let n = phi1.sin();
        if n.abs() < 1e-10 {
            return Err(VerifError::Projection(
                "conic projection undefined for a reference latitude on the equator".to_string(),
            ));
        }
        let m1 = msfn(phi1, e);
        let t1 = tsfn(phi1, e);
        let f = m1 / (n * t1.powf(n));
        let rho0 = GRS80_A * f * t1.powf(n);
        Ok(Self {
            a: GRS80_A,
            e,
            n,
            f,
            rho0,
            lon0: lon0_deg.to_radians(),
        })
    }

    /// Geographic degrees to planar metres.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let phi = lat_deg.to_radians();
        let rho = if (phi.abs() - FRAC_PI_2).abs() < 1e-12 {
            if phi * self.n > 0.0 { 0.0 } else { f64::INFINITY }
        } else {
            self.a * self.f * tsfn(phi, self.e).powf(self.n)
        };
        let theta = self.n * wrap_pi(lon_deg.to_radians() - self.lon0);
        (rho * theta.sin(), self.rho0 - rho * theta.cos())
    }

    /// Planar metres back to geographic degrees `(lon, lat)`.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let sign = self.n.signum();
        let dy = self.rho0 - y;
        let rho = sign * x.hypot(dy);
        if rho == 0.0 {
            return (self.lon0.to_degrees(), sign * 90.0);
        }
        let t = (rho / (self.a * self.f)).powf(1.0 / self.n);
        let theta = (sign * x).atan2(sign * dy);
        let lon = theta / self.n + self.lon0;
        let lat = latitude_from_t(t, self.e);
        (wrap_pi(lon).to_degrees(), lat.to_degrees())
    }
}

/// Box spanned by a grid of `nimax` x `njmax` points centred on
/// (`xloncen`, `xlatcen`). `lat_max` is taken at the top-centre, the
/// longitudes at the top corners and `lat_min` at the bottom-left corner.
pub fn compute_bounding_box(geometry: &DomainGeometry) -> Result<BoundingBox, VerifError> {
    let projection = LambertConformal::tangent(geometry.xlat0, geometry.xlon0)?;
    let half_height = (geometry.njmax / 2) as f64 * geometry.xdy;
    let half_width = (geometry.nimax / 2) as f64 * geometry.xdx;

    let (x0, y0) = projection.forward(geometry.xloncen, geometry.xlatcen);
    let (_, lat_max) = projection.inverse(x0, y0 + half_height);
    let (lon_min, _) = projection.inverse(x0 - half_width, y0 + half_height);
    let (lon_max, _) = projection.inverse(x0 + half_width, y0 + half_height);
    let (_, lat_min) = projection.inverse(x0 - half_width, y0 - half_height);

    let bbox = BoundingBox {
        lon_min,
        lon_max,
        lat_min,
        lat_max,
    };
    if !bbox.to_array().iter().all(|value| value.is_finite()) {
        return Err(VerifError::Projection(format!(
            "domain extent is not representable: {bbox:?}"
        )));
    }
    Ok(bbox)
}

fn msfn(phi: f64, e: f64) -> f64 {
    let sin_phi = phi.sin();
    phi.cos() / (1.0 - e * e * sin_phi * sin_phi).sqrt()
}

fn tsfn(phi: f64, e: f64) -> f64 {
    let e_sin = e * phi.sin();
    (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - e_sin) / (1.0 + e_sin)).powf(e / 2.0)
}

/// Geodetic latitude from the isometric quantity `t`, via the conformal
/// latitude and its fourth-order series in e^2.
fn latitude_from_t(t: f64, e: f64) -> f64 {
    let chi = FRAC_PI_2 - 2.0 * t.atan();
    let e2 = e * e;
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let e8 = e4 * e4;
    chi + (e2 / 2.0 + 5.0 * e4 / 24.0 + e6 / 12.0 + 13.0 * e8 / 360.0) * (2.0 * chi).sin()
        + (7.0 * e4 / 48.0 + 29.0 * e6 / 240.0 + 811.0 * e8 / 11520.0) * (4.0 * chi).sin()
        + (7.0 * e6 / 120.0 + 81.0 * e8 / 1120.0) * (6.0 * chi).sin()
        + (4279.0 * e8 / 161_280.0) * (8.0 * chi).sin()
}

fn wrap_pi(angle: f64) -> f64 {
    let wrapped = (angle + std::f64::consts::PI).rem_euclid(std::f64::consts::TAU);
    wrapped - std::f64::consts::PI
}
