/// LU with partial pivoting for banded matrices
pub mod lu_band_nalg;
