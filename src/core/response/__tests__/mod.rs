mod response_model_test;
