/// In-place L2 normalization. Zero vectors are left untouched.
pub fn l2_normalize_in_place(v: &mut [f32]) {
    let norm_sq: f32 = v.iter().map(|x| x * x).sum();
    if norm_sq > 0.0 {
        let inv_norm = norm_sq.sqrt().recip();
        for x in v.iter_mut() {
            *x *= inv_norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_four_five() {
        let mut v = vec![3.0f32, -4.0];
        l2_normalize_in_place(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] + 0.8).abs() < 1e-6);
    }

    #[test]
    fn zero_and_empty_are_noops() {
        let mut zero = vec![0.0f32; 3];
        l2_normalize_in_place(&mut zero);
        assert_eq!(zero, vec![0.0; 3]);

        let mut empty: Vec<f32> = Vec::new();
        l2_normalize_in_place(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn result_has_unit_length() {
        let mut v: Vec<f32> = (1..=64).map(|i| i as f32).collect();
        l2_normalize_in_place(&mut v);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }
}
