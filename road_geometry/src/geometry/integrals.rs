/// Normalized Fresnel integrals `(S(t), C(t))` with the `sin(PI/2 * u^2)`
/// kernel, the convention used by the clothoid formulas.
pub fn fresnel_integrals(t: f64) -> (f64, f64) {
    fresnel::fresnl(t)
}
