use std::path::PathBuf;

use anyhow::Result;
use biaqc_core::io::open_series;
use biaqc_core::metadata::series_metadata;
use clap::Args;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let series = open_series(&args.file)?;
    let path = series.path();
    let dims = series.dimensions();

    println!("File:        {}", path.file_path.display());
    println!("Image name:  {}", path.image_name);
    println!("Extension:   {}", path.extension);
    println!("Axes:        {}", dims.order());
    println!("Shape:       {:?}", dims.shape());
    println!("Dimensions:  {}x{}", dims.width(), dims.height());

    match series_metadata(series.as_ref()) {
        Ok(planes) => {
            println!("Planes:      {}", planes.len());
            if let Some(first) = planes.first() {
                if let Some(ref model) = first.instrument_model {
                    println!("Instrument:  {}", model);
                }
                if let Some(bits) = first.significant_bits {
                    println!("Bit depth:   {}", bits);
                }
                if let Some(ref unit) = first.delta_t_unit {
                    println!("Time unit:   {}", unit);
                }
            }
        }
        Err(e) => println!("Metadata:    unavailable ({e})"),
    }

    Ok(())
}
