mod test_grid_basic;
mod test_interpolation_basic;
