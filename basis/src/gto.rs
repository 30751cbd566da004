#![allow(non_snake_case)]
//! Primitive Cartesian Gaussians and their integrals via the
//! McMurchie-Davidson Hermite expansion.

extern crate nalgebra as na;

use crate::basis::Basis;
use crate::helper::boys_function;
use itertools::iproduct;
use na::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// One Cartesian factor x^l exp(-alpha x²) of a primitive, normalized on the line.
#[derive(Debug, Serialize, Deserialize, Copy, Clone)]
pub struct GTO1d {
    pub alpha: f64,
    pub l: i32,
    pub center: f64,
    pub norm: f64,
}

/// (2l - 1)!!, with (-1)!! = 1.
fn double_factorial_odd(l: i32) -> f64 {
    (1..=l).fold(1.0, |acc, k| acc * (2 * k - 1) as f64)
}

impl GTO1d {
    pub fn new(alpha: f64, l: i32, center: f64) -> Self {
        Self {
            alpha,
            l,
            center,
            norm: GTO1d::compute_norm(alpha, l),
        }
    }

    /// N² = (4 alpha)^l sqrt(2 alpha / pi) / (2l - 1)!!
    fn compute_norm(alpha: f64, l: i32) -> f64 {
        let n_squared =
            (4.0 * alpha).powi(l) * (2.0 * alpha / PI).sqrt() / double_factorial_odd(l);
        n_squared.sqrt()
    }

    pub(crate) fn evaluate(&self, x: f64) -> f64 {
        let x = x - self.center;
        self.norm * x.powi(self.l) * (-self.alpha * x * x).exp()
    }

    /// Hermite expansion coefficient E^{ij}_t for the product of two
    /// one-dimensional Gaussians separated by `Qx = A - B`.
    pub fn Eab(i: i32, j: i32, t: i32, Qx: f64, a: f64, b: f64) -> f64 {
        let p = a + b;
        let q = a * b / p;

        if t < 0 || t > i + j || i < 0 || j < 0 {
            0.0
        } else if i == 0 && j == 0 && t == 0 {
            (-q * Qx * Qx).exp()
        } else if j == 0 {
            GTO1d::Eab(i - 1, j, t - 1, Qx, a, b) / (2.0 * p)
                - GTO1d::Eab(i - 1, j, t, Qx, a, b) * q * Qx / a
                + GTO1d::Eab(i - 1, j, t + 1, Qx, a, b) * (t + 1) as f64
        } else {
            GTO1d::Eab(i, j - 1, t - 1, Qx, a, b) / (2.0 * p)
                + GTO1d::Eab(i, j - 1, t, Qx, a, b) * q * Qx / b
                + GTO1d::Eab(i, j - 1, t + 1, Qx, a, b) * (t + 1) as f64
        }
    }

    pub(crate) fn Sab(a: &GTO1d, b: &GTO1d) -> f64 {
        let p = a.alpha + b.alpha;
        let Qx = a.center - b.center;
        GTO1d::Eab(a.l, b.l, 0, Qx, a.alpha, b.alpha) * (PI / p).sqrt() * a.norm * b.norm
    }

    /// -1/2 <a|d²/dx²|b>, differentiating the ket:
    /// d²/dx² x^l e^{-bx²} = l(l-1) x^{l-2} - 2b(2l+1) x^l + 4b² x^{l+2}.
    pub(crate) fn Tab(a: &GTO1d, b: &GTO1d) -> f64 {
        let p = a.alpha + b.alpha;
        let Qx = a.center - b.center;
        let lb = b.l as f64;

        let lowered = lb * (lb - 1.0) * GTO1d::Eab(a.l, b.l - 2, 0, Qx, a.alpha, b.alpha);
        let same = -2.0 * b.alpha * (2.0 * lb + 1.0) * GTO1d::Eab(a.l, b.l, 0, Qx, a.alpha, b.alpha);
        let raised = 4.0 * b.alpha * b.alpha * GTO1d::Eab(a.l, b.l + 2, 0, Qx, a.alpha, b.alpha);

        -0.5 * a.norm * b.norm * (PI / p).sqrt() * (lowered + same + raised)
    }
}

/// Normalized primitive Cartesian Gaussian x^l y^m z^n exp(-alpha r²).
#[derive(Debug, Serialize, Deserialize, Copy, Clone)]
pub struct GTO {
    pub alpha: f64,
    pub l_xyz: Vector3<i32>,
    pub center: Vector3<f64>,
    pub norm: f64,
    pub gto1d: [GTO1d; 3],
}

impl GTO {
    pub fn new(alpha: f64, l_xyz: Vector3<i32>, center: Vector3<f64>) -> Self {
        let gto1d = [
            GTO1d::new(alpha, l_xyz.x, center.x),
            GTO1d::new(alpha, l_xyz.y, center.y),
            GTO1d::new(alpha, l_xyz.z, center.z),
        ];
        let norm = gto1d[0].norm * gto1d[1].norm * gto1d[2].norm;
        Self {
            alpha,
            l_xyz,
            center,
            norm,
            gto1d,
        }
    }

    /// Same primitive moved to a new centre; normalization does not depend on it.
    pub fn recentered(&self, center: Vector3<f64>) -> Self {
        GTO::new(self.alpha, self.l_xyz, center)
    }

    /// Gaussian product centre of two primitives.
    fn product_center(a: &GTO, b: &GTO) -> Vector3<f64> {
        (a.center * a.alpha + b.center * b.alpha) / (a.alpha + b.alpha)
    }

    /// Hermite expansion coefficients of the pair (a, b) along x, y and z.
    fn hermite_pair(a: &GTO, b: &GTO, t: i32, u: i32, v: i32) -> f64 {
        let ab = a.center - b.center;
        GTO1d::Eab(a.l_xyz.x, b.l_xyz.x, t, ab.x, a.alpha, b.alpha)
            * GTO1d::Eab(a.l_xyz.y, b.l_xyz.y, u, ab.y, a.alpha, b.alpha)
            * GTO1d::Eab(a.l_xyz.z, b.l_xyz.z, v, ab.z, a.alpha, b.alpha)
    }

    /// Hermite Coulomb integral R^n_{tuv}(p, PC) (Helgaker, Jørgensen, Olsen).
    pub fn hermite_coulomb(t: i32, u: i32, v: i32, n: i32, p: f64, pc: &Vector3<f64>) -> f64 {
        if t < 0 || u < 0 || v < 0 {
            return 0.0;
        }

        if t == 0 && u == 0 && v == 0 {
            (-2.0 * p).powi(n) * boys_function(n, p * pc.norm_squared())
        } else if t == 0 && u == 0 {
            (v - 1) as f64 * GTO::hermite_coulomb(t, u, v - 2, n + 1, p, pc)
                + pc.z * GTO::hermite_coulomb(t, u, v - 1, n + 1, p, pc)
        } else if t == 0 {
            (u - 1) as f64 * GTO::hermite_coulomb(t, u - 2, v, n + 1, p, pc)
                + pc.y * GTO::hermite_coulomb(t, u - 1, v, n + 1, p, pc)
        } else {
            (t - 1) as f64 * GTO::hermite_coulomb(t - 2, u, v, n + 1, p, pc)
                + pc.x * GTO::hermite_coulomb(t - 1, u, v, n + 1, p, pc)
        }
    }
}

impl Basis for GTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        self.gto1d[0].evaluate(r.x) * self.gto1d[1].evaluate(r.y) * self.gto1d[2].evaluate(r.z)
    }

    fn Sab(a: &GTO, b: &GTO) -> f64 {
        GTO1d::Sab(&a.gto1d[0], &b.gto1d[0])
            * GTO1d::Sab(&a.gto1d[1], &b.gto1d[1])
            * GTO1d::Sab(&a.gto1d[2], &b.gto1d[2])
    }

    fn Tab(a: &GTO, b: &GTO) -> f64 {
        let s: Vec<f64> = (0..3).map(|k| GTO1d::Sab(&a.gto1d[k], &b.gto1d[k])).collect();
        let t: Vec<f64> = (0..3).map(|k| GTO1d::Tab(&a.gto1d[k], &b.gto1d[k])).collect();

        t[0] * s[1] * s[2] + s[0] * t[1] * s[2] + s[0] * s[1] * t[2]
    }

    fn Vab(a: &GTO, b: &GTO, R: Vector3<f64>, Z: u32) -> f64 {
        let p = a.alpha + b.alpha;
        let pc = GTO::product_center(a, b) - R;
        let l_sum = a.l_xyz + b.l_xyz;

        let val: f64 = iproduct!(0..=l_sum.x, 0..=l_sum.y, 0..=l_sum.z)
            .map(|(t, u, v)| GTO::hermite_pair(a, b, t, u, v) * GTO::hermite_coulomb(t, u, v, 0, p, &pc))
            .sum();

        // attraction, hence the sign
        -(Z as f64) * a.norm * b.norm * 2.0 * PI / p * val
    }

    fn JKabcd(a: &GTO, b: &GTO, c: &GTO, d: &GTO) -> f64 {
        let p = a.alpha + b.alpha;
        let q = c.alpha + d.alpha;
        let alpha = p * q / (p + q);
        let pq = GTO::product_center(a, b) - GTO::product_center(c, d);
        let l_ab = a.l_xyz + b.l_xyz;
        let l_cd = c.l_xyz + d.l_xyz;

        let bra: Vec<(i32, i32, i32, f64)> = iproduct!(0..=l_ab.x, 0..=l_ab.y, 0..=l_ab.z)
            .map(|(t, u, v)| (t, u, v, GTO::hermite_pair(a, b, t, u, v)))
            .filter(|&(_, _, _, e)| e != 0.0)
            .collect();
        let ket: Vec<(i32, i32, i32, f64)> = iproduct!(0..=l_cd.x, 0..=l_cd.y, 0..=l_cd.z)
            .map(|(t, u, v)| {
                let sign = if (t + u + v) % 2 == 0 { 1.0 } else { -1.0 };
                (t, u, v, sign * GTO::hermite_pair(c, d, t, u, v))
            })
            .filter(|&(_, _, _, e)| e != 0.0)
            .collect();

        let mut val = 0.0;
        for &(t, u, v, e_ab) in &bra {
            for &(tau, nu, phi, e_cd) in &ket {
                val += e_ab
                    * e_cd
                    * GTO::hermite_coulomb(t + tau, u + nu, v + phi, 0, alpha, &pq);
            }
        }

        a.norm * b.norm * c.norm * d.norm * val * 2.0 * PI.powf(2.5) / (p * q * (p + q).sqrt())
    }
}
