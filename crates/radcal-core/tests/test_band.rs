use radcal_core::band::{Band, PanelReflectance};
use radcal_core::error::RadcalError;

#[test]
fn test_band_indices_follow_filename_suffixes() {
    let indices: Vec<u8> = Band::ALL.iter().map(|b| b.index()).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    assert_eq!(Band::Nir.index(), 4);
    assert_eq!(Band::RedEdge.index(), 5);
}

#[test]
fn test_band_from_index() {
    for band in Band::ALL {
        assert_eq!(Band::from_index(band.index()), Some(band));
    }
    assert_eq!(Band::from_index(0), None);
    assert_eq!(Band::from_index(6), None);
}

#[test]
fn test_band_from_name_ignores_case_and_whitespace() {
    assert_eq!(Band::from_name("Red edge").unwrap(), Band::RedEdge);
    assert_eq!(Band::from_name(" nir ").unwrap(), Band::Nir);
    assert_eq!(Band::from_name("BLUE").unwrap(), Band::Blue);
}

#[test]
fn test_band_from_name_unknown() {
    let err = Band::from_name("Thermal").unwrap_err();
    assert!(matches!(err, RadcalError::UnknownBand(ref name) if name == "Thermal"));
}

#[test]
fn test_band_display_matches_metadata_names() {
    assert_eq!(Band::Blue.to_string(), "Blue");
    assert_eq!(Band::Nir.to_string(), "NIR");
    assert_eq!(Band::RedEdge.to_string(), "Red edge");
}

#[test]
fn test_band_serde_uses_display_names() {
    let json = serde_json::to_string(&vec![Band::Nir, Band::RedEdge]).unwrap();
    assert_eq!(json, r#"["NIR","Red edge"]"#);
    let back: Vec<Band> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, vec![Band::Nir, Band::RedEdge]);
}

#[test]
fn test_panel_reflectance_defaults() {
    let r = PanelReflectance::default();
    assert_eq!(r.get(Band::Blue), 0.5105);
    assert_eq!(r.get(Band::Green), 0.50993);
    assert_eq!(r.get(Band::Red), 0.50921);
    assert_eq!(r.get(Band::Nir), 0.50807);
    assert_eq!(r.get(Band::RedEdge), 0.50889);
}
