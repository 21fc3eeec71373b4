#![no_main]

use libfuzzer_sys::fuzz_target;

use tree_ensemble::{ModelDescriptor, OpSignature, ValidateOptions};

fuzz_target!(|data: &[u8]| {
    let Ok(descriptor) = ModelDescriptor::from_bytes(data) else {
        return;
    };
    let Ok(model) = descriptor.validate(&OpSignature::dense(4, 4), &ValidateOptions::default())
    else {
        return;
    };
    let mut scores = [0.0; 4];
    model.evaluate(&[0.0, 1.0, -1.0, f32::NAN], &mut scores);
});
