//! Renderer: the deterministic rasterizer.
//!
//! Takes one `ResolvedScene` per animation tick and produces a `Frame` for
//! the player: a full grid the first time (or after a resize), and a
//! cell-level diff against the previous grid afterwards.
//!
//! Rasterizing is pure. The only state kept is the last grid, so the
//! player never has to repaint cells that did not change.

use crate::types::{Cell, CellChange, Frame, Grid, ResolvedScene, TerminalContract};

pub struct Renderer {
    contract: TerminalContract,
    prev_grid: Option<Grid>,
}

impl Renderer {
    pub fn new(contract: TerminalContract) -> Self {
        Self {
            contract,
            prev_grid: None,
        }
    }

    pub fn contract(&self) -> TerminalContract {
        self.contract
    }

    /// Drop the remembered grid so the next frame is a full repaint.
    pub fn invalidate(&mut self, contract: TerminalContract) {
        self.contract = contract;
        self.prev_grid = None;
    }

    /// Render the next scene, diffing against whatever was drawn last.
    pub fn render(&mut self, scene: &ResolvedScene) -> Frame {
        let grid = Self::rasterize(scene, &self.contract);
        let frame = match &self.prev_grid {
            None => Frame::Full {
                cells: grid.clone(),
            },
            Some(prev) => Frame::Diff {
                changes: Self::diff(prev, &grid),
            },
        };
        self.prev_grid = Some(grid);
        frame
    }

    /// Rasterize a resolved scene onto a fixed-size cell grid.
    ///
    /// Draw operations are sorted by z-order so that higher z values
    /// paint over lower ones. Ops outside the contract are clipped.
    pub fn rasterize(scene: &ResolvedScene, contract: &TerminalContract) -> Grid {
        let w = contract.width as usize;
        let h = contract.height as usize;
        let mut grid = vec![vec![Cell::default(); w]; h];

        let mut ops: Vec<_> = scene.ops.iter().collect();
        ops.sort_by_key(|op| op.z_order);

        for op in ops {
            let x = op.x as usize;
            let y = op.y as usize;
            if x < w && y < h {
                grid[y][x] = Cell {
                    ch: op.ch,
                    style: op.style.clone(),
                };
            }
        }

        grid
    }

    /// Compute a cell-level diff between two grids.
    pub fn diff(prev: &[Vec<Cell>], next: &[Vec<Cell>]) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for (y, (prev_row, next_row)) in prev.iter().zip(next.iter()).enumerate() {
            for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
                if prev_cell != next_cell {
                    changes.push(CellChange {
                        x: x as u16,
                        y: y as u16,
                        cell: next_cell.clone(),
                    });
                }
            }
        }
        changes
    }
}
