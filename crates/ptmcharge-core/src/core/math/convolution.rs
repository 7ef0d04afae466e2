use crate::core::models::distribution::Distribution;

/// Direct convolution of two independent charge distributions.
///
/// Every pair of charges `(a, b)` contributes `P(a)·P(b)` to charge `a + b`. The result
/// starts at the sum of the two offsets and has `len(a) + len(b) - 1` entries, so its
/// support is fixed by the inputs alone.
pub fn convolve(a: &Distribution, b: &Distribution) -> Distribution {
    let (x, y) = (a.values(), b.values());
    let mut out = vec![0.0; x.len() + y.len() - 1];

    for (i, &pa) in x.iter().enumerate() {
        if pa == 0.0 {
            continue;
        }
        for (slot, &pb) in out[i..].iter_mut().zip(y) {
            *slot += pa * pb;
        }
    }

    Distribution::from_parts(a.support().minkowski_sum(&b.support()), out)
}

/// Raises `base` to the `exponent`-th convolution power by binary exponentiation.
///
/// Only `O(log exponent)` calls to `convolve` are made. The convolution itself is
/// injected so the same ladder serves both the direct and the transform-domain engine.
/// An exponent of zero yields the point mass at charge 0.
pub fn convolution_power<E, F>(
    base: &Distribution,
    exponent: u32,
    mut convolve: F,
) -> Result<Distribution, E>
where
    F: FnMut(&Distribution, &Distribution) -> Result<Distribution, E>,
{
    let mut result: Option<Distribution> = None;
    let mut square = base.clone();
    let mut remaining = exponent;

    while remaining > 0 {
        if remaining & 1 == 1 {
            result = Some(match result {
                None => square.clone(),
                Some(acc) => convolve(&acc, &square)?,
            });
        }
        remaining >>= 1;
        if remaining > 0 {
            square = convolve(&square, &square)?;
        }
    }

    Ok(result.unwrap_or_else(|| Distribution::point_mass(0)))
}
