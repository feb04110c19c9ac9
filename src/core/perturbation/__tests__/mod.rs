mod generator_test;
