use ark_bn254::Fr;

use crate::error::TreeError;
use crate::hash::{poseidon, PoseidonError};
use crate::types::PathElements;

/// The immutable arity of every tree in the engine.
pub const TREE_ARITY: usize = 5;

/// The largest depth held in memory (5^9 leaves).
pub const MAX_TREE_DEPTH: u8 = 9;

/// A fixed depth quinary merkle tree stored as a flat array of nodes, the
/// root at index 0 and the children of node `i` at `5i + 1 ..= 5i + 5`.
#[derive(Clone, Debug, PartialEq)]
pub struct QuinaryTree
{
    /// The fixed depth of the tree.
    depth: u8,

    /// The value of an untouched node, per level, leaf level first.
    zeros: Vec<Fr>,

    /// Every node of the tree.
    nodes: Vec<Fr>,
}

pub trait QuinaryMerkleTree: Sized
{
    /// The error type for the hash function.
    type HashError;

    /// Create a tree where every leaf takes the value `zero`.
    fn new(depth: u8, zero: Fr) -> Result<Self, TreeError>;

    /// The root of the tree.
    fn root(&self) -> Fr;

    /// Sets the leaf at `index` and recomputes its ancestors.
    fn update_leaf(&mut self, index: u64, value: Fr) -> Result<(), TreeError>;

    /// The leaf at `index`.
    fn leaf(&self, index: u64) -> Result<Fr, TreeError>;

    /// Every leaf, in index order.
    fn leaves(&self) -> &[Fr];

    /// Replaces every leaf at once; leaves beyond `values` take the zero value.
    fn init_leaves(&mut self, values: &[Fr]) -> Result<(), TreeError>;

    /// The four siblings of each node on the path from leaf `index` to the root.
    fn path_element_of(&self, index: u64) -> Result<PathElements, TreeError>;

    /// The position of each node on the path from leaf `index` among its siblings.
    fn path_idx_of(&self, index: u64) -> Result<Vec<u8>, TreeError>;

    /// A copy of the tree in which only the first `length` leaves are kept.
    fn sub_tree(&self, length: u64) -> Result<Self, TreeError>;

    /// Hash function used to compute parent nodes.
    fn hash(inputs: &[Fr]) -> Result<Fr, Self::HashError>;
}

impl QuinaryTree
{
    /// The number of addressable leaves.
    pub fn capacity(&self) -> u64
    {
        (TREE_ARITY as u64).pow(self.depth as u32)
    }

    pub fn depth(&self) -> u8
    {
        self.depth
    }

    /// The value of an untouched leaf.
    pub fn zero(&self) -> Fr
    {
        self.zeros[0]
    }

    /// The index of the first node at `level` counted from the root.
    fn level_offset(level: u8) -> usize
    {
        ((TREE_ARITY.pow(level as u32)) - 1) / (TREE_ARITY - 1)
    }

    fn leaf_offset(&self) -> usize
    {
        Self::level_offset(self.depth)
    }

    fn ensure_index(&self, index: u64) -> Result<usize, TreeError>
    {
        let capacity = self.capacity();
        if index >= capacity
        {
            Err(TreeError::LeafIndexOutOfRange { index, capacity })?
        }
        Ok(self.leaf_offset() + index as usize)
    }

    fn compute_parent(&mut self, parent: usize) -> Result<(), TreeError>
    {
        let first = parent * TREE_ARITY + 1;
        self.nodes[parent] = Self::hash(&self.nodes[first..first + TREE_ARITY])?;
        Ok(())
    }

    fn update_ancestors(&mut self, node: usize) -> Result<(), TreeError>
    {
        let mut node = node;
        while node > 0
        {
            let parent = (node - 1) / TREE_ARITY;
            self.compute_parent(parent)?;
            node = parent;
        }
        Ok(())
    }
}

impl QuinaryMerkleTree for QuinaryTree
{
    type HashError = PoseidonError;

    fn new(depth: u8, zero: Fr) -> Result<QuinaryTree, TreeError>
    {
        if depth > MAX_TREE_DEPTH
        {
            Err(TreeError::DepthTooLarge { depth, max: MAX_TREE_DEPTH })?
        }

        let mut zeros = Vec::with_capacity(depth as usize + 1);
        zeros.push(zero);
        for level in 1..=depth as usize
        {
            zeros.push(Self::hash(&[zeros[level - 1]; TREE_ARITY])?);
        }

        // Every node at distance `level` from the root holds the zero of the
        // subtree below it.
        let mut nodes = Vec::with_capacity(Self::level_offset(depth + 1));
        for level in 0..=depth
        {
            let count = TREE_ARITY.pow(level as u32);
            nodes.extend(std::iter::repeat(zeros[(depth - level) as usize]).take(count));
        }

        Ok(QuinaryTree { depth, zeros, nodes })
    }

    fn root(&self) -> Fr
    {
        self.nodes[0]
    }

    fn update_leaf(&mut self, index: u64, value: Fr) -> Result<(), TreeError>
    {
        let node = self.ensure_index(index)?;
        self.nodes[node] = value;
        self.update_ancestors(node)
    }

    fn leaf(&self, index: u64) -> Result<Fr, TreeError>
    {
        let node = self.ensure_index(index)?;
        Ok(self.nodes[node])
    }

    fn leaves(&self) -> &[Fr]
    {
        &self.nodes[self.leaf_offset()..]
    }

    fn init_leaves(&mut self, values: &[Fr]) -> Result<(), TreeError>
    {
        let capacity = self.capacity();
        if values.len() as u64 > capacity
        {
            Err(TreeError::LeafIndexOutOfRange { index: values.len() as u64 - 1, capacity })?
        }

        let offset = self.leaf_offset();
        let zero = self.zero();
        for (i, node) in self.nodes[offset..].iter_mut().enumerate()
        {
            *node = values.get(i).copied().unwrap_or(zero);
        }

        for parent in (0..offset).rev()
        {
            self.compute_parent(parent)?;
        }

        Ok(())
    }

    fn path_element_of(&self, index: u64) -> Result<PathElements, TreeError>
    {
        let mut node = self.ensure_index(index)?;
        let mut path = Vec::with_capacity(self.depth as usize);

        while node > 0
        {
            let parent = (node - 1) / TREE_ARITY;
            let first = parent * TREE_ARITY + 1;

            let mut siblings = [Fr::default(); TREE_ARITY - 1];
            let mut slot = 0;
            for child in first..first + TREE_ARITY
            {
                if child == node { continue; }
                siblings[slot] = self.nodes[child];
                slot += 1;
            }

            path.push(siblings);
            node = parent;
        }

        Ok(path)
    }

    fn path_idx_of(&self, index: u64) -> Result<Vec<u8>, TreeError>
    {
        let mut node = self.ensure_index(index)?;
        let mut path = Vec::with_capacity(self.depth as usize);

        while node > 0
        {
            path.push(((node - 1) % TREE_ARITY) as u8);
            node = (node - 1) / TREE_ARITY;
        }

        Ok(path)
    }

    /// Only the nodes straddling the boundary at `length` need rehashing:
    /// everything to their left is shared with `self` and everything to their
    /// right is a zero subtree.
    fn sub_tree(&self, length: u64) -> Result<QuinaryTree, TreeError>
    {
        let capacity = self.capacity();
        if length > capacity
        {
            Err(TreeError::LeafIndexOutOfRange { index: length, capacity })?
        }

        let mut tree = self.clone();
        if length == capacity { return Ok(tree); }

        // `boundary` is the index, within its level, of the first node whose
        // subtree holds no kept leaf.
        let mut boundary = length as usize;
        for height in 0..=self.depth
        {
            let level = self.depth - height;
            let offset = Self::level_offset(level);
            let count = TREE_ARITY.pow(level as u32);
            let zero = self.zeros[height as usize];

            if height > 0 && boundary > 0
            {
                // The last partially kept node at this level has children on
                // both sides of the boundary.
                let straddling = (boundary - 1) + offset;
                if straddling < offset + count
                {
                    tree.compute_parent(straddling)?;
                }
            }

            for node in tree.nodes[offset + boundary.min(count)..offset + count].iter_mut()
            {
                *node = zero;
            }

            boundary = (boundary + TREE_ARITY - 1) / TREE_ARITY;
        }

        Ok(tree)
    }

    /// The circom Poseidon hash of a node's children.
    fn hash(inputs: &[Fr]) -> Result<Fr, Self::HashError>
    {
        poseidon(inputs)
    }
}
