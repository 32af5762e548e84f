//! Splits the sheet stream into volumes.

use crate::config::VolumeConfig;
use crate::crossref::CrossReferenceHandler;
use crate::page::Page;
use crate::sheet::Sheet;
use crate::split::handler::SplitPointHandler;
use crate::split::source::SplitPointDataSource;
use crate::split::{NoSupplements, SplitOptions};
use crate::FlowError;
use log::{debug, info};
use std::cell::RefCell;
use std::rc::Rc;

/// A bound volume: consecutive sheets, numbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    number: usize,
    sheets: Vec<Sheet>,
}

impl Volume {
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.sheets.iter().flat_map(|s| s.pages())
    }

    pub fn page_count(&self) -> usize {
        self.pages().count()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct VolumeSplitter {
    handler: SplitPointHandler,
}

impl VolumeSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills volumes of at most `max_sheets` sheets, preferring the breaks with the
    /// lowest avoid priority. Registers the volume number of every placed identifier.
    pub fn split<D>(
        &self,
        sheets: D,
        config: &VolumeConfig,
        registry: &RefCell<CrossReferenceHandler>,
    ) -> Result<Vec<Volume>, FlowError>
    where
        D: SplitPointDataSource<Sheet>,
    {
        let options = SplitOptions::new().force(true).trim(true).minimize_cost();
        let capacity = config.max_sheets as f32;
        let mut data = sheets;
        let mut volumes = Vec::new();

        while !data.is_empty()? {
            let spec = self.handler.find(capacity, &data, &NoSupplements, options)?;
            let split = self.handler.split(&spec, &data, &NoSupplements)?;
            let number = volumes.len() + 1;

            let sheets: Vec<Sheet> = split
                .head
                .into_iter()
                .map(|s| Rc::try_unwrap(s).unwrap_or_else(|rc| (*rc).clone()))
                .collect();
            {
                let mut registry = registry.borrow_mut();
                for id in sheets.iter().flat_map(|s| s.pages()).flat_map(|p| p.identifiers()) {
                    registry.set_volume_number(id.clone(), number);
                }
            }
            debug!("Volume {number}: {} sheet(s) ({:?})", sheets.len(), spec.kind);

            if !sheets.is_empty() {
                volumes.push(Volume { number, sheets });
            }
            data = split.tail;
        }

        info!("Split {} volume(s)", volumes.len());
        Ok(volumes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{DocumentSpace, SheetIdentity};
    use crate::sheet_source::SheetDataSource;
    use crate::split::source::BufferedDataSource;
    use crate::test_utils::*;
    use sheetflow_types::{BlockId, Row, RowGroup};

    fn sheet(ordinal: usize, breakable: bool, avoid: Option<u32>) -> Sheet {
        let page = Page::new("default", 5.0, DocumentSpace::Body, 0, ordinal + 1, ordinal);
        Sheet::new(SheetIdentity::body(ordinal), vec![page], breakable, avoid)
    }

    fn numbers(volumes: &[Volume]) -> Vec<Vec<usize>> {
        volumes
            .iter()
            .map(|v| v.sheets().iter().map(|s| s.identity().ordinal).collect())
            .collect()
    }

    #[test]
    fn test_volumes_respect_max_sheets() {
        let registry = RefCell::new(CrossReferenceHandler::new());
        let sheets = BufferedDataSource::from_items((0..5).map(|i| sheet(i, true, None)));
        let volumes = VolumeSplitter::new()
            .split(sheets, &VolumeConfig { max_sheets: 2 }, &registry)
            .unwrap();

        assert_eq!(numbers(&volumes), vec![vec![0, 1], vec![2, 3], vec![4]]);
        assert_eq!(volumes[2].number(), 3);
    }

    #[test]
    fn test_volume_break_avoids_priorities() {
        let registry = RefCell::new(CrossReferenceHandler::new());
        let sheets = BufferedDataSource::from_items(vec![
            sheet(0, true, None),
            sheet(1, true, None),
            sheet(2, true, Some(2)),
            sheet(3, true, None),
        ]);
        let volumes = VolumeSplitter::new()
            .split(sheets, &VolumeConfig { max_sheets: 3 }, &registry)
            .unwrap();

        assert_eq!(numbers(&volumes), vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn test_unbreakable_sheets_stay_together() {
        let registry = RefCell::new(CrossReferenceHandler::new());
        let sheets = BufferedDataSource::from_items(vec![
            sheet(0, true, None),
            sheet(1, false, Some(1)),
            sheet(2, true, None),
            sheet(3, true, None),
        ]);
        let volumes = VolumeSplitter::new()
            .split(sheets, &VolumeConfig { max_sheets: 2 }, &registry)
            .unwrap();

        assert_eq!(numbers(&volumes), vec![vec![0], vec![1, 2], vec![3]]);
    }

    #[test]
    fn test_volume_numbers_are_registered() {
        init_logger();
        let fixture = Fixture::new(config(1.0));
        let groups: Vec<RowGroup> = (0..6)
            .map(|i| RowGroup::builder().identifier(format!("b{i}")).row(Row::new("x")).build())
            .collect();
        let sequences = [sequence(groups)];
        let sheets = SheetDataSource::new(&sequences, fixture.context());

        let volumes = VolumeSplitter::new()
            .split(sheets, &VolumeConfig { max_sheets: 2 }, &fixture.registry)
            .unwrap();

        assert_eq!(volumes.len(), 2);
        assert_eq!(volumes[0].page_count(), 4);
        let registry = fixture.registry.borrow();
        assert_eq!(registry.volume_number(&BlockId::new("b0")), Some(1));
        assert_eq!(registry.volume_number(&BlockId::new("b5")), Some(2));
    }
}
