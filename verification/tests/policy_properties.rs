use std::sync::Arc;

use kyc_nullables::{NullVisionService, VisionCall};
use kyc_types::ValidationCriteria;
use kyc_verification::{PolicyEngine, VerificationError};
use proptest::prelude::*;
use tracing::Span;

fn run<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(f)
}

fn engine(vision: Arc<NullVisionService>) -> PolicyEngine {
    PolicyEngine::new(vision, ValidationCriteria::default(), Span::none())
}

proptest! {
    #[test]
    fn decision_follows_similarity(similarity in 0.0f32..=100.0) {
        let vision = Arc::new(NullVisionService::new());
        vision.set_comparison(Ok(NullVisionService::matching(similarity)));

        let result = run(engine(vision).verify(b"id", b"selfie")).unwrap();
        prop_assert_eq!(result.verified, similarity >= 70.0);
        prop_assert_eq!(result.similarity, similarity);
        let formatted = format!("{similarity:.2}");
        prop_assert!(result.message.contains(&formatted));
    }

    #[test]
    fn same_inputs_same_decision(similarity in 0.0f32..=100.0) {
        let vision = Arc::new(NullVisionService::new());
        vision.set_comparison(Ok(NullVisionService::matching(similarity)));
        let engine = engine(vision);

        let first = run(engine.verify(b"id", b"selfie")).unwrap();
        let second = run(engine.verify(b"id", b"selfie")).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn extra_faces_never_reach_comparison(count in 2usize..6) {
        let vision = Arc::new(NullVisionService::new());
        let mut detection = NullVisionService::single_face(99.0, 80.0, 80.0);
        let face = detection.faces[0].clone();
        detection.faces.resize(count, face);
        vision.set_detection(Ok(detection));

        let err = run(engine(vision.clone()).verify(b"id", b"selfie")).unwrap_err();
        prop_assert!(matches!(err, VerificationError::FaceCountInvalid(n) if n == count));
        let compared = vision.calls().iter().any(|c| matches!(c, VisionCall::CompareFaces { .. }));
        prop_assert!(!compared);
    }

    #[test]
    fn quality_below_threshold_rejected(brightness in 0.0f32..50.0, sharpness in 0.0f32..=100.0) {
        let vision = Arc::new(NullVisionService::new());
        vision.set_detection(Ok(NullVisionService::single_face(95.0, brightness, sharpness)));

        let err = run(engine(vision).verify(b"id", b"selfie")).unwrap_err();
        let is_poor_quality = matches!(err, VerificationError::PoorImageQuality { .. });
        prop_assert!(is_poor_quality);
    }
}
