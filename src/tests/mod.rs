
mod sampler_test;
