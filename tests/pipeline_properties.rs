use imagetune_core::codec::{self, EncodedImage};
use imagetune_core::mosaic::{MosaicRequest, MosaicResponse, MosaicService};
use imagetune_core::{
    Adjustment, AdjustmentParameters, AdjustmentPipeline, ColorFilterChain, Effect, EmbossBorder,
    ImageProcessor, MosaicError, ParameterState, PixelBuffer,
};
use std::sync::Arc;

fn gradient(width: u32, height: u32) -> PixelBuffer {
    let mut buf = PixelBuffer::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(1)) as i32;
            let g = (y * 255 / height.max(1)) as i32;
            let b = ((x + y) * 17 % 256) as i32;
            let a = 128 + ((x * 31 + y * 7) % 128) as i32;
            buf.set(x, y, [r, g, b, a]).unwrap();
        }
    }
    buf
}

fn red_4x4() -> PixelBuffer {
    PixelBuffer::filled(4, 4, [255, 0, 0, 255]).unwrap()
}

fn encoded(buffer: &PixelBuffer) -> Arc<EncodedImage> {
    Arc::new(EncodedImage::new("image/png", codec::encode_png(buffer).unwrap()))
}

fn busy_params() -> AdjustmentParameters {
    let mut p = AdjustmentParameters::default();
    p.set(Adjustment::Contrast, 130.0).unwrap();
    p.set(Adjustment::Brightness, 90.0).unwrap();
    p.set(Adjustment::Saturation, 160.0).unwrap();
    p.set(Adjustment::Blur, 1.5).unwrap();
    p.set(Adjustment::HueRotate, 45.0).unwrap();
    p.set(Adjustment::Opacity, 80.0).unwrap();
    p.set_effect(Effect::Sepia, true);
    p.set_effect(Effect::Emboss, true);
    p
}

#[test]
fn test_neutral_parameters_are_identity() {
    let src = gradient(9, 7);
    let mut pipeline = AdjustmentPipeline::default();
    let out = pipeline.run(&encoded(&src), &AdjustmentParameters::BASELINE).unwrap();
    assert_eq!(out.buffer, src);
}

#[test]
fn test_runs_are_deterministic() {
    let src = gradient(12, 10);
    let image = encoded(&src);
    let params = busy_params();
    let mut pipeline = AdjustmentPipeline::default();
    let a = pipeline.run(&image, &params).unwrap();
    let b = pipeline.run(&image, &params).unwrap();
    let c = AdjustmentPipeline::default().run(&image, &params).unwrap();
    assert_eq!(a.buffer.as_raw(), b.buffer.as_raw());
    assert_eq!(a.buffer.as_raw(), c.buffer.as_raw());
}

#[test]
fn test_reset_then_run_is_identity() {
    let src = gradient(6, 6);
    let mut state = ParameterState::new(EncodedImage::new("image/png", codec::encode_png(&src).unwrap()));
    let mut pipeline = AdjustmentPipeline::default();

    for (field, value) in [
        (Adjustment::Contrast, 10.0),
        (Adjustment::Blur, 7.0),
        (Adjustment::HueRotate, 300.0),
        (Adjustment::Opacity, 0.0),
    ] {
        state.set_adjustment(field, value).unwrap();
        pipeline.run(state.current_image(), state.params()).unwrap();
    }
    state.set_effect(Effect::Grayscale, true);
    state.replace_image(EncodedImage::new(
        "image/png",
        codec::encode_png(&PixelBuffer::filled(2, 2, [0, 0, 0, 255]).unwrap()).unwrap(),
    ));
    pipeline.run(state.current_image(), state.params()).unwrap();

    state.reset();
    let out = pipeline.run(state.current_image(), state.params()).unwrap();
    assert_eq!(out.buffer, src);
}

#[test]
fn test_invert_is_self_inverse_for_every_value() {
    let mut data = Vec::with_capacity(256 * 256 * 4);
    for r in 0..=255u8 {
        for g in 0..=255u8 {
            data.extend_from_slice(&[r, g, r ^ g, g]);
        }
    }
    let src = PixelBuffer::from_raw(256, 256, data).unwrap();
    let mut params = AdjustmentParameters::default();
    params.set_effect(Effect::Invert, true);
    let chain = ColorFilterChain::from_params(&params);
    assert_eq!(chain.apply(&chain.apply(&src)), src);
}

#[test]
fn test_emboss_on_uniform_color() {
    let src = PixelBuffer::filled(6, 5, [31, 200, 99, 170]).unwrap();
    let mut params = AdjustmentParameters::default();
    params.set_effect(Effect::Emboss, true);
    let out = AdjustmentPipeline::default().run_buffer(&src, &params).unwrap();
    for y in 1..4 {
        for x in 1..5 {
            assert_eq!(out.buffer.get(x, y).unwrap(), [127, 127, 127, 170]);
        }
    }
}

#[test]
fn test_emboss_off_matches_chain_output() {
    let src = gradient(8, 8);
    let mut params = busy_params();
    params.set_effect(Effect::Emboss, false);
    let chain_only = ColorFilterChain::from_params(&params).apply(&src);
    let out = AdjustmentPipeline::default().run_buffer(&src, &params).unwrap();
    assert_eq!(out.buffer, chain_only);
}

#[test]
fn test_saturation_extremes() {
    let src = gradient(10, 4);
    let pipeline = AdjustmentPipeline::default();

    let mut desaturated = AdjustmentParameters::default();
    desaturated.set(Adjustment::Saturation, 0.0).unwrap();
    let mut gray = AdjustmentParameters::default();
    gray.set_effect(Effect::Grayscale, true);
    let a = pipeline.run_buffer(&src, &desaturated).unwrap();
    let b = pipeline.run_buffer(&src, &gray).unwrap();
    assert_eq!(a.buffer, b.buffer);
    for px in a.buffer.as_raw().chunks_exact(4) {
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    let mut full = AdjustmentParameters::default();
    full.set(Adjustment::Contrast, 140.0).unwrap();
    let mut full_with_sat = full;
    full_with_sat.set(Adjustment::Saturation, 100.0).unwrap();
    assert_eq!(
        pipeline.run_buffer(&src, &full).unwrap().buffer,
        pipeline.run_buffer(&src, &full_with_sat).unwrap().buffer
    );
}

#[test]
fn test_red_square_with_contrast_150() {
    let mut params = AdjustmentParameters::default();
    params.set(Adjustment::Contrast, 150.0).unwrap();
    let out = AdjustmentPipeline::default().run_buffer(&red_4x4(), &params).unwrap();
    assert_eq!(out.buffer, red_4x4());
}

#[test]
fn test_red_square_with_emboss() {
    let mut params = AdjustmentParameters::default();
    params.set_effect(Effect::Emboss, true);

    let out = AdjustmentPipeline::new(EmbossBorder::CopySource)
        .run_buffer(&red_4x4(), &params)
        .unwrap();
    for (x, y) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
        assert_eq!(out.buffer.get(x, y).unwrap(), [127, 127, 127, 255]);
    }
    for (x, y) in [(0, 0), (3, 0), (0, 3), (3, 3), (1, 0), (0, 2)] {
        assert_eq!(out.buffer.get(x, y).unwrap(), [255, 0, 0, 255]);
    }

    let out = AdjustmentPipeline::new(EmbossBorder::Transparent)
        .run_buffer(&red_4x4(), &params)
        .unwrap();
    assert_eq!(out.buffer.get(1, 2).unwrap(), [127, 127, 127, 255]);
    assert_eq!(out.buffer.get(3, 1).unwrap(), [0, 0, 0, 0]);
}

struct FailingTransport;

impl MosaicService for FailingTransport {
    fn create_mosaic(&self, request: &MosaicRequest) -> Result<MosaicResponse, MosaicError> {
        assert!(request.image.starts_with("data:image/png;base64,"));
        Err(MosaicError::Transport("connection reset".into()))
    }
}

#[test]
fn test_mosaic_transport_failure_keeps_previous_result() {
    let mut processor = ImageProcessor::default();
    processor
        .load_bytes(codec::encode_png(&gradient(8, 6)).unwrap())
        .unwrap();
    processor.set_adjustment(Adjustment::Brightness, 130.0).unwrap();
    processor.set_effect(Effect::Emboss, true).unwrap();
    let r0 = processor.current_render().unwrap().clone();
    let params_before = *processor.state().unwrap().params();

    let err = processor.create_mosaic(&FailingTransport).unwrap_err();
    assert!(matches!(err, MosaicError::Transport(_)));

    let state = processor.state().unwrap();
    assert!(!state.is_substituted());
    assert_eq!(state.params(), &params_before);
    assert_eq!(processor.render().unwrap(), &r0);
}
