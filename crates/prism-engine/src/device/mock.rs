//! In-memory backend for lifecycle tests (no GPU required).
//!
//! Every object carries a unique id and records its creation and release in
//! a log shared with the test through a cloned `MockBackend`.

use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use anyhow::anyhow;

use crate::coords::OutputSize;

use super::{BackendError, CapabilityTier, GraphicsBackend, PresentError, PresentationWindow};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) enum Kind {
    Device,
    Context,
    SwapChain,
    RenderTarget,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum Event {
    Created(Kind, u64),
    Released(Kind, u64),
    DoubleRelease(Kind, u64),
    Resized(u64, OutputSize),
    Presented(u64),
}

#[derive(Debug, Copy, Clone)]
pub(crate) enum ScriptedPresent {
    DeviceLost,
    Failure,
}

#[derive(Default)]
struct MockState {
    next_id: u64,
    events: Vec<Event>,
    live: HashSet<(Kind, u64)>,
    rejected_tiers: Vec<CapabilityTier>,
    attempted_tiers: Vec<CapabilityTier>,
    swap_chain_failures: u32,
    render_target_failures: u32,
    resize_failures: u32,
    present_script: VecDeque<ScriptedPresent>,
}

/// Owning handle; records its release on drop.
pub(crate) struct MockHandle {
    kind: Kind,
    id: u64,
    state: Rc<RefCell<MockState>>,
}

impl MockHandle {
    fn new(kind: Kind, state: &Rc<RefCell<MockState>>) -> Self {
        let mut st = state.borrow_mut();
        st.next_id += 1;
        let id = st.next_id;
        st.live.insert((kind, id));
        st.events.push(Event::Created(kind, id));
        Self {
            kind,
            id,
            state: Rc::clone(state),
        }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        let mut st = self.state.borrow_mut();
        if st.live.remove(&(self.kind, self.id)) {
            st.events.push(Event::Released(self.kind, self.id));
        } else {
            st.events.push(Event::DoubleRelease(self.kind, self.id));
        }
    }
}

pub(crate) struct MockDevice {
    handle: MockHandle,
    pub tier: CapabilityTier,
}

impl MockDevice {
    pub fn id(&self) -> u64 {
        self.handle.id
    }
}

pub(crate) struct MockContext {
    handle: MockHandle,
}

impl MockContext {
    pub fn id(&self) -> u64 {
        self.handle.id
    }
}

pub(crate) struct MockSwapChain {
    handle: MockHandle,
    pub device: u64,
    pub window: u32,
    pub size: OutputSize,
    pub back_buffer: u64,
}

impl MockSwapChain {
    pub fn id(&self) -> u64 {
        self.handle.id
    }
}

pub(crate) struct MockRenderTarget {
    handle: MockHandle,
    pub swap_chain: u64,
    pub size: OutputSize,
}

impl MockRenderTarget {
    pub fn id(&self) -> u64 {
        self.handle.id
    }
}

/// Window stand-in whose client area the test can change at will.
#[derive(Clone)]
pub(crate) struct MockWindow {
    id: u32,
    size: Rc<Cell<OutputSize>>,
}

impl MockWindow {
    pub fn new(id: u32, size: OutputSize) -> Self {
        Self {
            id,
            size: Rc::new(Cell::new(size)),
        }
    }

    pub fn set_size(&self, size: OutputSize) {
        self.size.set(size);
    }
}

impl PresentationWindow for MockWindow {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }

    fn client_size(&self) -> OutputSize {
        self.size.get()
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockBackend {
    state: Rc<RefCell<MockState>>,
}

impl MockBackend {
    pub fn reject_tiers(&self, tiers: &[CapabilityTier]) {
        self.state.borrow_mut().rejected_tiers.extend_from_slice(tiers);
    }

    pub fn fail_next_swap_chain(&self) {
        self.state.borrow_mut().swap_chain_failures += 1;
    }

    pub fn fail_next_resize(&self) {
        self.state.borrow_mut().resize_failures += 1;
    }

    pub fn fail_next_render_target(&self) {
        self.state.borrow_mut().render_target_failures += 1;
    }

    pub fn script_present(&self, outcome: ScriptedPresent) {
        self.state.borrow_mut().present_script.push_back(outcome);
    }

    pub fn attempted_tiers(&self) -> Vec<CapabilityTier> {
        self.state.borrow().attempted_tiers.clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.borrow().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    /// Number of objects created and not yet released.
    pub fn live(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn created(&self, kind: Kind) -> usize {
        self.count(|e| matches!(e, Event::Created(k, _) if *k == kind))
    }

    pub fn released(&self, kind: Kind) -> usize {
        self.count(|e| matches!(e, Event::Released(k, _) if *k == kind))
    }

    pub fn saw_double_release(&self) -> bool {
        self.count(|e| matches!(e, Event::DoubleRelease(..))) > 0
    }

    fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.state.borrow().events.iter().filter(|e| pred(e)).count()
    }
}

impl GraphicsBackend for MockBackend {
    type Window = MockWindow;
    type Device = MockDevice;
    type Context = MockContext;
    type SwapChain = MockSwapChain;
    type RenderTarget = MockRenderTarget;

    fn create_device(
        &mut self,
        tier: CapabilityTier,
    ) -> Result<(MockDevice, MockContext), BackendError> {
        {
            let mut st = self.state.borrow_mut();
            st.attempted_tiers.push(tier);
            if st.rejected_tiers.contains(&tier) {
                return Err(anyhow!("{tier} tier rejected"));
            }
        }

        let device = MockDevice {
            handle: MockHandle::new(Kind::Device, &self.state),
            tier,
        };
        let context = MockContext {
            handle: MockHandle::new(Kind::Context, &self.state),
        };
        Ok((device, context))
    }

    fn create_swap_chain(
        &mut self,
        device: &MockDevice,
        window: &MockWindow,
        size: OutputSize,
    ) -> Result<MockSwapChain, BackendError> {
        {
            let mut st = self.state.borrow_mut();
            if st.swap_chain_failures > 0 {
                st.swap_chain_failures -= 1;
                return Err(anyhow!("swap chain creation rejected"));
            }
        }

        Ok(MockSwapChain {
            handle: MockHandle::new(Kind::SwapChain, &self.state),
            device: device.id(),
            window: window.id(),
            size,
            back_buffer: 0,
        })
    }

    fn resize_swap_chain(
        &mut self,
        _device: &MockDevice,
        swap_chain: &mut MockSwapChain,
        size: OutputSize,
    ) -> Result<(), BackendError> {
        let mut st = self.state.borrow_mut();
        if st.resize_failures > 0 {
            st.resize_failures -= 1;
            return Err(anyhow!("buffer resize rejected"));
        }

        swap_chain.size = size;
        st.events.push(Event::Resized(swap_chain.id(), size));
        Ok(())
    }

    fn create_render_target(
        &mut self,
        _device: &MockDevice,
        swap_chain: &mut MockSwapChain,
    ) -> Result<MockRenderTarget, BackendError> {
        {
            let mut st = self.state.borrow_mut();
            if st.render_target_failures > 0 {
                st.render_target_failures -= 1;
                return Err(anyhow!("render target creation rejected"));
            }
        }

        Ok(MockRenderTarget {
            handle: MockHandle::new(Kind::RenderTarget, &self.state),
            swap_chain: swap_chain.id(),
            size: swap_chain.size,
        })
    }

    fn present(
        &mut self,
        _device: &MockDevice,
        swap_chain: &mut MockSwapChain,
        _target: &mut MockRenderTarget,
    ) -> Result<(), PresentError> {
        let scripted = self.state.borrow_mut().present_script.pop_front();
        match scripted {
            Some(ScriptedPresent::DeviceLost) => Err(PresentError::DeviceLost {
                reason: "scripted device removal".to_string(),
            }),
            Some(ScriptedPresent::Failure) => {
                Err(PresentError::Failure(anyhow!("scripted present failure")))
            }
            None => {
                swap_chain.back_buffer += 1;
                self.state
                    .borrow_mut()
                    .events
                    .push(Event::Presented(swap_chain.id()));
                Ok(())
            }
        }
    }
}
