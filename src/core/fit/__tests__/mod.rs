mod line_fit_test;
