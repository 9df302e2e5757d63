use std::fmt;

/// Side length of the biome grid. Chunk coordinates wrap modulo this, so
/// the map tiles infinitely in both axes.
pub const MAP_SIZE: usize = 128;

/// Terrain/climate category for one grid cell. Codes are stable and used
/// by the integer form of the biome-map file; names are the lowercase
/// string form.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Biome {
    #[default]
    Plains,
    Forest,
    Mountains,
    Desert,
    Water,
    Snow,
    Ocean,
    ColdOcean,
    IceOcean,
}

impl Biome {
    pub const ALL: [Biome; 9] = [
        Biome::Plains,
        Biome::Forest,
        Biome::Mountains,
        Biome::Desert,
        Biome::Water,
        Biome::Snow,
        Biome::Ocean,
        Biome::ColdOcean,
        Biome::IceOcean,
    ];

    pub fn code(self) -> u8 {
        match self {
            Biome::Plains => 0,
            Biome::Forest => 1,
            Biome::Mountains => 2,
            Biome::Desert => 3,
            Biome::Water => 4,
            Biome::Snow => 5,
            Biome::Ocean => 6,
            Biome::ColdOcean => 7,
            Biome::IceOcean => 8,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Biome::ALL.into_iter().find(|biome| biome.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            Biome::Plains => "plains",
            Biome::Forest => "forest",
            Biome::Mountains => "mountains",
            Biome::Desert => "desert",
            Biome::Water => "water",
            Biome::Snow => "snow",
            Biome::Ocean => "ocean",
            Biome::ColdOcean => "cold_ocean",
            Biome::IceOcean => "ice_ocean",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Biome::ALL.into_iter().find(|biome| biome.name() == name)
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Square grid of biome labels with toroidal addressing. Immutable once
/// built; the classifier is the only producer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BiomeGrid {
    side: usize,
    cells: Vec<Biome>,
}

impl BiomeGrid {
    pub fn from_cells(side: usize, cells: Vec<Biome>) -> Result<Self, GridShapeError> {
        if side == 0 || cells.len() != side * side {
            return Err(GridShapeError {
                side,
                cells: cells.len(),
            });
        }
        Ok(Self { side, cells })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Label at (x, y), wrapping both axes modulo the side length.
    pub fn get(&self, x: i32, y: i32) -> Biome {
        let side = self.side as i32;
        let x = x.rem_euclid(side) as usize;
        let y = y.rem_euclid(side) as usize;
        self.cells[x * self.side + y]
    }

    pub fn cells(&self) -> &[Biome] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Biome]> {
        self.cells.chunks_exact(self.side)
    }

    /// Averaged label over the in-bounds 3x3 neighborhood, for display
    /// only. The stored grid is never touched.
    pub fn blend(&self, x: i32, y: i32) -> Biome {
        let side = self.side as i32;
        let mut sum = 0u32;
        let mut count = 0u32;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let nx = x + dx;
                let ny = y + dy;
                if (0..side).contains(&nx) && (0..side).contains(&ny) {
                    sum += u32::from(self.cells[nx as usize * self.side + ny as usize].code());
                    count += 1;
                }
            }
        }
        let averaged = (f64::from(sum) / f64::from(count)).round() as u8;
        Biome::from_code(averaged).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridShapeError {
    pub side: usize,
    pub cells: usize,
}

impl fmt::Display for GridShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "biome grid shape mismatch: side {} requires {} cells, got {}",
            self.side,
            self.side * self.side,
            self.cells
        )
    }
}

impl std::error::Error for GridShapeError {}
